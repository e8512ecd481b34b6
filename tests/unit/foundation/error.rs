use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StyleError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(StyleError::eval("x").to_string().contains("evaluation error:"));
    assert!(StyleError::build("x").to_string().contains("build error:"));
    assert!(StyleError::patch("x").to_string().contains("patch error:"));
    assert!(StyleError::asset("x").to_string().contains("asset error:"));
    assert!(
        StyleError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn compile_error_names_the_pointer() {
    let err = StyleError::compile("/static/poi/when", "unexpected token");
    assert_eq!(
        err.to_string(),
        "compile error at /static/poi/when: unexpected token"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StyleError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_convert() {
    let err: StyleError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, StyleError::Serde(_)));
}
