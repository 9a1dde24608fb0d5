// tests/config_env.rs
// Mutates process env and CWD, so every test here is #[serial].

use std::{env, fs};

use opinion_analytics::config::{Backend, PipelineConfig};
use opinion_analytics::normalize::Language;
use opinion_analytics::sentiment::ClassifierMode;

const KEYS: [&str; 6] = [
    "OPINION_CONFIG_PATH",
    "OPINION_CLASSIFIER_MODE",
    "OPINION_LANGUAGE",
    "OPINION_BACKEND",
    "OPINION_TOP_TERMS",
    "HF_API_TOKEN",
];

/// Snapshot & restore env vars for one test.
struct EnvSnapshot {
    saved: Vec<(String, Option<String>)>,
}

impl EnvSnapshot {
    /// Clears every pipeline key, then applies `pairs`.
    fn set(pairs: &[(&str, &str)]) -> Self {
        let saved = KEYS
            .iter()
            .map(|k| (k.to_string(), env::var(k).ok()))
            .collect();
        for k in KEYS {
            env::remove_var(k);
        }
        for (k, v) in pairs {
            env::set_var(k, v);
        }
        Self { saved }
    }
}

impl Drop for EnvSnapshot {
    fn drop(&mut self) {
        for (k, maybe_v) in self.saved.drain(..) {
            match maybe_v {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

#[serial_test::serial]
#[test]
fn explicit_path_wins_and_env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    fs::write(
        &path,
        r#"
language = "english"
classifier_mode = "ordinal"
top_terms = 5
"#,
    )
    .unwrap();

    let path_str = path.display().to_string();
    let _env = EnvSnapshot::set(&[
        ("OPINION_CONFIG_PATH", path_str.as_str()),
        ("OPINION_CLASSIFIER_MODE", "binary"),
    ]);

    let cfg = PipelineConfig::from_env().unwrap();
    assert_eq!(cfg.language, Language::English);
    assert_eq!(cfg.classifier_mode, ClassifierMode::Binary);
    assert_eq!(cfg.top_terms, 5);
    // Unset keys keep their defaults.
    assert_eq!(cfg.classify_max_chars, 512);
    assert_eq!(cfg.summarize_max_chars, 1024);
}

#[serial_test::serial]
#[test]
fn missing_explicit_path_is_an_error() {
    let _env = EnvSnapshot::set(&[("OPINION_CONFIG_PATH", "/definitely/not/here.toml")]);
    let err = PipelineConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("OPINION_CONFIG_PATH"), "{err}");
}

#[serial_test::serial]
#[test]
fn falls_back_to_defaults_outside_the_repo() {
    let _env = EnvSnapshot::set(&[("OPINION_TOP_TERMS", " 3 ")]);
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    let cfg = PipelineConfig::from_env();
    env::set_current_dir(&old).unwrap();

    let cfg = cfg.unwrap();
    assert_eq!(cfg.backend, Backend::Lexicon);
    assert_eq!(cfg.classifier_mode, ClassifierMode::Ordinal);
    assert_eq!(cfg.language, Language::Spanish);
    assert_eq!(cfg.top_terms, 3);
}

#[serial_test::serial]
#[test]
fn bad_override_values_are_rejected() {
    let _env = EnvSnapshot::set(&[("OPINION_CLASSIFIER_MODE", "trinary")]);
    assert!(PipelineConfig::from_env().is_err());

    let _env = EnvSnapshot::set(&[("OPINION_TOP_TERMS", "-1")]);
    assert!(PipelineConfig::from_env().is_err());
}

#[serial_test::serial]
#[test]
fn remote_backend_requires_a_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    fs::write(&path, "backend = \"huggingface\"\n").unwrap();
    let path_str = path.display().to_string();

    let _env = EnvSnapshot::set(&[("OPINION_CONFIG_PATH", path_str.as_str())]);
    let err = PipelineConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("HF_API_TOKEN"), "{err}");

    let _env = EnvSnapshot::set(&[
        ("OPINION_CONFIG_PATH", path_str.as_str()),
        ("HF_API_TOKEN", "hf_test"),
    ]);
    let cfg = PipelineConfig::from_env().unwrap();
    assert_eq!(cfg.backend, Backend::HuggingFace);
    assert_eq!(cfg.huggingface.api_token, "hf_test");
}
