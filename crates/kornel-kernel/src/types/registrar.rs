//! Installing enum types and the metadata the type help is built from.

use tracing::debug;

use super::discipline::EnumDiscipline;
use super::enum_type::EnumDescriptor;
use super::{TYPE_NAMESPACE, TypeTable};

/// Help metadata for a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// `, v0, v1, ...`
    pub values: String,
    /// The default value.
    pub default: String,
    /// Empty, or `not ` for case-insensitive types.
    pub case: String,
}

impl TypeInfo {
    fn for_enum(descriptor: &EnumDescriptor) -> Self {
        let mut values = String::new();
        for value in descriptor.values() {
            values.push_str(", ");
            values.push_str(value);
        }
        Self {
            values,
            default: descriptor.default_value().to_string(),
            case: if descriptor.is_case_insensitive() { "not ".into() } else { String::new() },
        }
    }

    /// Metadata field by key, as the type printer asks for it.
    pub fn field(&self, key: &str) -> &str {
        match key {
            "default" => &self.default,
            "case" => &self.case,
            _ => &self.values,
        }
    }

    /// Usage text for the declaration command of `type_name`.
    pub fn usage(&self, type_name: &str) -> String {
        let t = type_name;
        format!(
            "Usage: {t} [-r] [-a|-A] [-h string] [-S] [name[=value]...]\n\
             \n\
             {t} - create an instance of type {t}\n\
             \n\
             {t} creates a variable for each name with enumeration type {t} where\n\
             {t} is a type that has been created with the enum command.\n\
             \n\
             The variable can have one of the following values{values}.\n\
             The values are {case}case sensitive.\n\
             If =value is omitted, the default is {default}.\n\
             If no names are specified then the names and values of all variables\n\
             of this type are written to standard output.\n\
             \n\
             Options:\n\
             \x20 -r          readonly; the value cannot be changed or unset\n\
             \x20 -a          index array; an existing value becomes index 0\n\
             \x20 -A          associative array; an existing value becomes subscript 0\n\
             \x20 -h string   help string for the variable\n\
             \x20 -S          shared by each instance; invalid values are fatal\n",
            values = self.field("values"),
            case = self.field("case"),
            default = self.field("default"),
        )
    }
}

/// A registered type.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    path: String,
    discipline: EnumDiscipline,
    info: TypeInfo,
}

impl TypeEntry {
    pub fn name(&self) -> &str {
        self.discipline.descriptor().name()
    }

    /// Synthetic node name, e.g. `.sh.type.Color`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn descriptor(&self) -> &EnumDescriptor {
        self.discipline.descriptor()
    }

    pub fn discipline(&self) -> &EnumDiscipline {
        &self.discipline
    }

    pub fn info(&self) -> &TypeInfo {
        &self.info
    }
}

impl TypeTable {
    /// Install `descriptor` as a type, replacing any type of the same name.
    ///
    /// Variables already bound to a replaced type keep their own copy of
    /// the old descriptor.
    pub fn register(&mut self, descriptor: EnumDescriptor) -> &TypeEntry {
        let path = format!("{TYPE_NAMESPACE}.{}", descriptor.name());
        debug!(
            name = descriptor.name(),
            values = descriptor.values().len(),
            ignorecase = descriptor.is_case_insensitive(),
            "registering enum type"
        );
        let info = TypeInfo::for_enum(&descriptor);
        self.insert(TypeEntry {
            path,
            discipline: EnumDiscipline::new(descriptor),
            info,
        })
    }
}
