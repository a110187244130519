//! Enumeration types end to end through the kernel.

use std::path::PathBuf;

use kornel_kernel::{Kernel, KernelConfig, VfsMountMode};
use rstest::rstest;

fn kernel() -> Kernel {
    Kernel::new(KernelConfig::isolated()).unwrap()
}

async fn out(kernel: &Kernel, script: &str) -> String {
    let result = kernel.execute(script).await.unwrap();
    assert!(result.ok(), "{script}: {}", result.err);
    result.out
}

// =============================================================================
// Reads, writes and arithmetic
// =============================================================================

#[rstest]
#[case::string_read("enum T=(a b c); T x=b; print $x", "b\n")]
#[case::ordinal_read("enum T=(a b c); T x=b; print $((x))", "1\n")]
#[case::child_constant("enum T=(a b c); T x=b; print ${x.c}", "2\n")]
#[case::colour("enum Color=(red green blue); Color c=green; echo $((c)) ${c.blue}", "1 2\n")]
#[case::ignore_case("enum -i M=(On Off); M m=off; echo $m", "Off\n")]
#[case::default_value("enum Color=(red green blue); Color c; echo $c", "red\n")]
#[case::reassign("enum Color=(red green blue); Color c; c=blue; echo $c", "blue\n")]
#[case::arith_constants("enum Color=(red green blue); Color c=blue; echo $((c == blue)) $((c < green))", "1 0\n")]
#[case::bool_alias("bool b=true; echo $b $((b)) $((!b))", "true 1 0\n")]
#[case::typed_array("enum Color=(red green blue); Color -a arr=(red blue); echo ${arr[1]} ${arr[@]}", "blue red blue\n")]
#[case::assoc_array("enum Color=(red green blue); Color -A m=([fg]=blue [bg]=red); echo ${m[fg]} ${m[bg]}", "blue red\n")]
#[case::from_plain_array("vals=(lo hi); enum vals; vals v=hi; echo $((v))", "1\n")]
#[case::unset_detaches("enum Color=(red green blue); Color c=red; unset c; c=anything; echo $c", "anything\n")]
#[case::quoted_values("enum Q=('a b' \"c'd\"); Q q='c'\\''d'; echo $((q))", "1\n")]
#[tokio::test]
async fn enum_scenarios(#[case] script: &str, #[case] expected: &str) {
    assert_eq!(out(&kernel(), script).await, expected);
}

#[tokio::test]
async fn invalid_writes_keep_old_value() {
    let k = kernel();
    let result = k
        .execute("enum Color=(red green blue); Color c=green; c=purple; echo $c; c=RED; echo $c")
        .await
        .unwrap();
    assert_eq!(result.out, "green\ngreen\n");
    assert_eq!(result.err.matches("invalid value").count(), 2);
}

#[tokio::test]
async fn typed_array_rejects_bad_element() {
    let k = kernel();
    let result = k
        .execute("enum Color=(red green blue); Color -a arr=(red blue); arr[0]=purple; echo ${arr[0]}")
        .await
        .unwrap();
    assert_eq!(result.out, "red\n");
    assert!(result.err.contains("arr: invalid value purple"));
}

#[tokio::test]
async fn static_instances_abort_on_invalid_write() {
    let k = kernel();
    let result = k
        .execute("enum Color=(red green blue)\nColor -S c=red\nc=purple\necho unreachable")
        .await
        .unwrap();
    assert_eq!(result.code, 1);
    assert!(!result.out.contains("unreachable"));
}

#[tokio::test]
async fn readonly_instances() {
    let k = kernel();
    let result = k.execute("enum Color=(red green blue); Color -r c=blue; c=red; unset c; echo $c").await.unwrap();
    assert_eq!(result.out, "blue\n");
    assert_eq!(result.err.matches("is read only").count(), 2);
}

#[tokio::test]
async fn unknown_constant_is_an_error() {
    let k = kernel();
    let result = k.execute("enum Color=(red green blue); Color c; echo ${c.purple}").await.unwrap();
    assert_eq!(result.code, 1);
    assert!(result.err.contains("purple: invalid enum constant for c"));
}

// =============================================================================
// Declaration errors
// =============================================================================

#[rstest]
#[case::one_value("enum T=(only)")]
#[case::not_an_array("x=1; enum x")]
#[case::missing("enum nothing")]
#[case::duplicate("enum T=(a b a)")]
#[case::duplicate_ignoring_case("enum -i T=(a A)")]
#[tokio::test]
async fn enum_declaration_errors(#[case] script: &str) {
    let result = kernel().execute(script).await.unwrap();
    assert_eq!(result.code, 1, "{script}");
    assert!(result.err.starts_with("enum: "), "{}", result.err);
}

// =============================================================================
// Printing types back out
// =============================================================================

#[tokio::test]
async fn print_is_reparseable() {
    let first = kernel();
    out(&first, "enum Color=(red green blue); enum -i Switch=(On Off); enum Odd=('two words' \"it's\" '$x')").await;
    let printed = out(&first, "enum -p").await;

    let second = kernel();
    out(&second, &printed).await;
    assert_eq!(out(&second, "enum -p").await, printed);
    assert_eq!(
        out(&second, "enum -p Odd").await,
        "enum Odd=(\n\t'two words'\n\t'it'\\''s'\n\t'$x'\n)\n"
    );
}

#[tokio::test]
async fn redeclare_replaces_in_place() {
    let k = kernel();
    out(&k, "enum A=(x y); enum B=(p q); enum A=(x y z)").await;
    let printed = out(&k, "enum -p").await;
    let a = printed.find("enum A=").unwrap();
    let b = printed.find("enum B=").unwrap();
    assert!(a < b);
    assert!(printed.contains("enum A=(\n\tx\n\ty\n\tz\n)\n"));
}

#[tokio::test]
async fn print_json() {
    let k = kernel();
    let text = out(&k, "enum -i Switch=(On Off); enum -p --json Switch").await;
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["name"], "Switch");
    assert_eq!(json[0]["ignorecase"], true);
    assert_eq!(json[0]["values"][1], "Off");
}

#[tokio::test]
async fn type_help_and_listing() {
    let k = kernel();
    let help = out(&k, "enum -i Switch=(On Off); Switch --help").await;
    assert!(help.contains("one of the following values, On, Off."));
    assert!(help.contains("The values are not case sensitive."));
    assert!(help.contains("the default is On."));

    let listing = out(&k, "Switch b=off a; Switch").await;
    assert_eq!(listing, "a=On\nb=Off\n");
}

// =============================================================================
// Real files
// =============================================================================

#[tokio::test]
async fn cut_over_local_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("colors.tsv"), "1\tred\n2\tgreen\n").unwrap();
    let config = KernelConfig::isolated()
        .with_vfs_mode(VfsMountMode::Local {
            root: dir.path().to_path_buf(),
        })
        .with_cwd(PathBuf::from("/"));
    let k = Kernel::new(config).unwrap();

    assert_eq!(out(&k, "cut -f2 colors.tsv").await, "red\ngreen\n");
    let result = k.execute("cut -f2 ../outside.tsv").await.unwrap();
    assert_eq!(result.code, 1);
}
