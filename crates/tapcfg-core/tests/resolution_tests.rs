//! Integration tests for resolving the built-in tap catalog

use std::fs;
use std::path::Path;
use tapcfg_core::{
    CatalogContext, DefinitionError, DiagnosticKind, MapEnv, OptionDefBuilder, OptionValue,
    Provenance, Rank, Registry, ResolveInputs, ResolvePolicy, ResolvedConfig, load,
    render_config_dump, render_help, resolve, tap_registry,
};
use tempfile::TempDir;

/// Helper to build the catalog rooted at `cwd`
fn catalog(cwd: &Path) -> Registry {
    tap_registry(&CatalogContext {
        cpus: 4,
        stdout_is_tty: false,
        cwd: cwd.to_path_buf(),
    })
    .unwrap()
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

/// Helper to resolve and validate with the default policy
fn run(registry: &Registry, env: &MapEnv, tokens: &[&str]) -> ResolvedConfig {
    let args = args(tokens);
    let (config, _) = load(registry, &ResolveInputs::new(env, &args), &ResolvePolicy::default())
        .unwrap();
    config
}

#[test]
fn test_empty_inputs_yield_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let config = run(&registry, &MapEnv::new(), &[]);

    for def in registry.all().iter().filter(|def| !def.is_alias()) {
        assert_eq!(config.get(&def.name), def.default.as_ref(), "option {}", def.name);
        assert_eq!(config.provenance(&def.name), Some(&Provenance::Default));
    }
    assert!(config.diagnostics().is_empty());
    assert_eq!(config.num("jobs"), Some(4.0));
    assert!(config.flag("coverage"));
    assert!(!config.flag("check-coverage"));
}

#[test]
fn test_every_non_alias_option_is_a_key() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let config = run(&registry, &MapEnv::new(), &[]);

    let expected: Vec<_> = registry
        .all()
        .iter()
        .filter(|def| !def.is_alias())
        .map(|def| def.name.as_str())
        .collect();
    let keys: Vec<_> = config.values().keys().map(String::as_str).collect();
    assert_eq!(keys, expected);
    for alias in ["100", "no-timeout", "jobs-auto", "expose-gc", "harmony"] {
        assert!(!config.contains(alias));
    }
}

#[test]
fn test_cli_beats_rc_and_env_regardless_of_rc_order() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".taprc"),
        "bail: false\ntimeout: 60\nreporter: dot\n",
    )
    .unwrap();
    let registry = catalog(temp_dir.path());
    let env = MapEnv::from_pairs([("TAP_TIMEOUT", "10"), ("TAP_BAIL", "0")]);

    let config = run(&registry, &env, &["-t", "5", "-b"]);
    assert_eq!(config.num("timeout"), Some(5.0));
    assert!(config.flag("bail"));
    assert_eq!(config.string("reporter"), Some("dot"));
    assert_eq!(
        config.provenance("reporter"),
        Some(&Provenance::Explicit { rank: Rank::RcFile })
    );

    // The rc file outranks the environment.
    let config = run(&registry, &env, &[]);
    assert_eq!(config.num("timeout"), Some(60.0));
    assert_eq!(config.rc_file(), Some(temp_dir.path().join(".taprc").as_path()));
}

#[test]
fn test_combined_short_flags() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let env = MapEnv::new();

    let grouped = run(&registry, &env, &["-bCRspec"]);
    let separate = run(&registry, &env, &["-b", "-C", "-R", "spec"]);
    assert_eq!(grouped.values(), separate.values());
    assert!(grouped.flag("bail"));
    assert!(!grouped.flag("color"));
    assert_eq!(grouped.string("reporter"), Some("spec"));
}

#[test]
fn test_negation_after_flag() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let config = run(&registry, &MapEnv::new(), &["--bail", "--no-bail"]);
    assert!(!config.flag("bail"));
}

#[test]
fn test_explicit_no_coverage_beats_implication() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());

    let config = run(&registry, &MapEnv::new(), &["--check-coverage", "--no-coverage"]);
    assert!(!config.flag("coverage"));
    assert!(config.flag("check-coverage"));

    let config = run(&registry, &MapEnv::new(), &["--branches=80"]);
    assert!(config.flag("check-coverage"));
    assert_eq!(
        config.provenance("check-coverage"),
        Some(&Provenance::Implied {
            by: "branches".to_string(),
            rank: Rank::Cli,
        })
    );
}

#[test]
fn test_alias_expansion_is_transparent() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let env = MapEnv::new();

    let cases: [(&[&str], &[&str]); 4] = [
        (&["--100"], &["--branches=100", "--lines=100", "--functions=100", "--statements=100"]),
        (&["-T", "-b"], &["--timeout=0", "-b"]),
        (&["-b", "-gc", "--node-arg=x"], &["-b", "--node-arg=--expose-gc", "--node-arg=x"]),
        (&["-J"], &["--jobs=4"]),
    ];
    for (alias, manual) in cases {
        let via_alias = run(&registry, &env, alias);
        let by_hand = run(&registry, &env, manual);
        assert_eq!(via_alias.values(), by_hand.values(), "{alias:?} vs {manual:?}");
    }
}

#[test]
fn test_dump_round_trips_through_rc_file() {
    let first_dir = TempDir::new().unwrap();
    let registry = catalog(first_dir.path());
    let original = run(
        &registry,
        &MapEnv::new(),
        &["-bCRspec", "--branches=80", "-gc", "--grep=foo", "-t", "2.5", "a.js"],
    );
    let dump = render_config_dump(&original).unwrap();

    let second_dir = TempDir::new().unwrap();
    fs::write(second_dir.path().join(".taprc"), &dump).unwrap();
    let reloaded_registry = catalog(second_dir.path());
    let reloaded = run(&reloaded_registry, &MapEnv::new(), &[]);

    assert!(reloaded.diagnostics().is_empty(), "{:?}", reloaded.diagnostics());
    assert_eq!(reloaded.values(), original.values());
}

#[test]
fn test_out_of_range_is_exactly_one_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let args = args(&["--branches=150"]);
    let env = MapEnv::new();

    let (config, diagnostics) =
        load(&registry, &ResolveInputs::new(&env, &args), &ResolvePolicy::default()).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::OutOfRange);
    assert!(diagnostics[0].is_fatal());
    assert_eq!(config.get("branches"), Some(&OptionValue::Num(150.0)));
}

#[test]
fn test_unknown_inputs_are_warnings_unless_strict() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".taprc"), "bogus: 1\n").unwrap();
    let registry = catalog(temp_dir.path());
    let args = args(&["--frobnicate", "test.js"]);
    let env = MapEnv::new();
    let inputs = ResolveInputs::new(&env, &args);

    let (config, diagnostics) = load(&registry, &inputs, &ResolvePolicy::default()).unwrap();
    let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::UnknownRcKey, DiagnosticKind::UnknownOption]);
    assert!(config.is_ok());
    assert_eq!(config.positionals(), ["test.js"]);

    let (config, diagnostics) = load(&registry, &inputs, &ResolvePolicy::strict()).unwrap();
    assert!(diagnostics.iter().all(|d| d.is_fatal()));
    assert!(!config.is_ok());
}

#[test]
fn test_environment_only_variables() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let env = MapEnv::from_pairs([("TAP", "1"), ("TAP_NO_ESM", "1"), ("TAP_CHILD_ID", "3")]);

    let config = run(&registry, &env, &[]);
    assert_eq!(config.string("reporter"), Some("tap"));
    assert!(!config.flag("esm"));
    assert_eq!(config.num("TAP_CHILD_ID"), Some(3.0));

    // Environment-only names are not command-line options.
    let config = run(&registry, &MapEnv::new(), &["--TAP_CHILD_ID=3"]);
    assert_eq!(config.num("TAP_CHILD_ID"), None);
    assert_eq!(config.diagnostics()[0].kind, DiagnosticKind::UnknownOption);
}

#[test]
fn test_duplicate_short_fails_before_input() {
    let mut builder = Registry::builder();
    builder
        .define(OptionDefBuilder::flag("bail").short("b").build().unwrap())
        .unwrap();
    let err = builder
        .define(OptionDefBuilder::flag("browser").short("b").build().unwrap())
        .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateShort { .. }));
}

#[test]
fn test_alias_cycle_is_a_definition_error() {
    let mut builder = Registry::builder();
    builder
        .define(OptionDefBuilder::flag("ping").alias(["--pong"]).build().unwrap())
        .unwrap();
    builder
        .define(OptionDefBuilder::flag("pong").alias(["--ping"]).build().unwrap())
        .unwrap();
    assert!(matches!(builder.build(), Err(DefinitionError::AliasCycle(_))));
}

#[test]
fn test_help_lists_every_section_and_option() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let help = render_help(&registry);

    for section in registry.sections() {
        assert!(help.contains(&format!("{}:", section.title)), "section {}", section.title);
    }
    for def in registry.all() {
        assert!(help.contains(&def.name), "option {}", def.name);
    }
    assert!(help.contains("-bCRspec"));
}

#[test]
fn test_resolve_without_validation_keeps_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let args = args(&["-R", "fancy"]);
    let env = MapEnv::new();
    let config = resolve(&registry, &ResolveInputs::new(&env, &args)).unwrap();
    assert_eq!(config.string("reporter"), Some("fancy"));
    assert!(config.is_ok());
}

#[test]
fn test_bad_timeout_variable_is_one_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let env = MapEnv::from_pairs([("TAP_TIMEOUT", "-5")]);
    let args = args(&[]);

    let (_, diagnostics) =
        load(&registry, &ResolveInputs::new(&env, &args), &ResolvePolicy::default()).unwrap();
    let fatal: Vec<_> = diagnostics.iter().filter(|d| d.is_fatal()).collect();
    assert_eq!(fatal.len(), 1);
    assert_eq!(fatal[0].kind, DiagnosticKind::OutOfRange);
    assert_eq!(fatal[0].option.as_deref(), Some("timeout"));
}

#[test]
fn test_env_exports_hand_config_to_children() {
    let temp_dir = TempDir::new().unwrap();
    let registry = catalog(temp_dir.path());
    let config = run(
        &registry,
        &MapEnv::new(),
        &["--grep=a", "--grep=b", "-b", "-i", "-t", "2.5"],
    );

    let exports = config.env_exports(&registry);
    let get = |var: &str| {
        exports
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, value)| value.as_str())
    };
    assert_eq!(get("TAP_GREP"), Some("a\nb"));
    assert_eq!(get("TAP_BAIL"), Some("1"));
    assert_eq!(get("TAP_GREP_INVERT"), Some("1"));
    assert_eq!(get("TAP_TIMEOUT"), Some("2.5"));
    assert_eq!(get("TAP_ONLY"), Some("0"));
    assert_eq!(get("TAP_CHILD_ID"), None);

    // A child reading the exported variables sees the same settings.
    let child = run(&registry, &MapEnv::from_pairs(exports.clone()), &[]);
    for name in ["grep", "bail", "invert", "timeout", "only", "color"] {
        assert_eq!(child.get(name), config.get(name), "option {name}");
    }
}

#[test]
fn test_rc_null_clears_node_args() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".taprc"),
        "expose-gc: true\nnode-arg: null\n",
    )
    .unwrap();
    let registry = catalog(temp_dir.path());
    let config = run(&registry, &MapEnv::new(), &[]);
    assert!(config.list("node-arg").is_empty());
}
