use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults() {
    let cfg = RelayConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.persona, DEFAULT_PERSONA.trim());
    assert!(cfg.persona.contains("customer support assistant"));
}

#[test]
fn inline_persona_wins_over_file() {
    let cfg = RelayConfig::from_lookup(lookup_from(&[
        ("SUPPORT_PERSONA", "  Be brief.  "),
        ("SUPPORT_PERSONA_FILE", "/definitely/not/here.txt"),
        ("PORT", "8080"),
    ]))
    .unwrap();
    assert_eq!(cfg.persona, "Be brief.");
    assert_eq!(cfg.port, 8080);
}

#[test]
fn persona_file_is_read() {
    let path = std::env::temp_dir().join(format!("support-relay-persona-{}.txt", uuid::Uuid::new_v4()));
    std::fs::write(&path, "You answer billing questions.\n").unwrap();

    let cfg = RelayConfig::from_lookup(lookup_from(&[("SUPPORT_PERSONA_FILE", path.to_str().unwrap())])).unwrap();
    assert_eq!(cfg.persona, "You answer billing questions.");

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn missing_persona_file_errors() {
    let err = RelayConfig::from_lookup(lookup_from(&[("SUPPORT_PERSONA_FILE", "/definitely/not/here.txt")])).unwrap_err();
    assert!(matches!(err, ConfigError::PersonaFile { .. }));
}

#[test]
fn blank_persona_errors() {
    let err = RelayConfig::from_lookup(lookup_from(&[("SUPPORT_PERSONA", " \n ")])).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyPersona));
}

#[test]
fn invalid_port_errors() {
    let err = RelayConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
    assert!(err.to_string().contains("invalid PORT"));
}
