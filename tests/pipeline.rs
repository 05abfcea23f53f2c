//! End-to-end pipeline tests over on-disk dotfiles fixtures.

use std::fs;
use std::path::Path;

use keydash::config::EffectiveConfig;
use keydash::export::{Export, JSON_FILE, JS_FILE};
use keydash::{ExportTargets, Pipeline};
use keydash_model::{ActionType, LayerId, SourceId};
use serde_json::{json, Value};
use tempfile::TempDir;

const HYPER: [&str; 4] = ["command", "control", "option", "shift"];

fn karabiner_json() -> String {
    json!({
        "profiles": [{
            "name": "Default",
            "complex_modifications": {
                "rules": [{
                    "description": "Hyper layer",
                    "manipulators": [
                        {
                            "type": "basic",
                            "from": {"key_code": "w", "modifiers": {"mandatory": HYPER}},
                            "to": [{"shell_command": "/opt/homebrew/bin/aerospace summon-workspace 3"}]
                        },
                        {
                            "type": "basic",
                            "from": {"key_code": "f", "modifiers": {"mandatory": HYPER}},
                            "to": [{"shell_command": "aerospace layout floating tiling"}],
                            "conditions": [{"type": "variable_if", "name": "tiling", "value": 1}]
                        },
                        {
                            "type": "basic",
                            "from": {"key_code": "f", "modifiers": {"mandatory": HYPER}},
                            "to": [{"shell_command": "open -g rectangle://execute-action?name=maximize"}],
                            "conditions": [{"type": "variable_if", "name": "tiling", "value": 0}]
                        },
                        {
                            "type": "basic",
                            "from": {"key_code": "h", "modifiers": {"mandatory": ["option"]}},
                            "to": [{"shell_command": "aerospace focus right"}]
                        }
                    ]
                }]
            }
        }]
    })
    .to_string()
}

const AEROSPACE_TOML: &str = r#"
[mode.main.binding]
alt-h = 'focus left'
alt-j = 'focus down'
alt-q = 'close'
alt-shift-7 = 'move-node-to-workspace 7'

[mode.service.binding]
esc = ['reload-config', 'mode main']
"#;

const CHEATSHEET_LUA: &str = r#"
return {
    { title = "HYPER", items = {
        { "W", "Browser workspace" },
    } },
    { title = "ALT", items = {
        { "J", "Look down" },
    } },
}
"#;

struct Dotfiles {
    dir: TempDir,
}

impl Dotfiles {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let dotfiles = Self { dir };
        dotfiles.write(".config/karabiner/karabiner.json", &karabiner_json());
        dotfiles.write(".config/aerospace/aerospace.toml", AEROSPACE_TOML);
        dotfiles.write("hammerspoon/cheatsheet.lua", CHEATSHEET_LUA);
        dotfiles
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Write a config file pointing at this dotfiles tree, plus `extra` TOML
    fn config(&self, extra: &str) -> std::path::PathBuf {
        let path = self.root().join("keydash.toml");
        let body = format!(
            "dotfiles = {:?}\n{}\n[sources]\nrectangle = \"\"\n\n[output]\ndir = {:?}\n",
            self.root().to_string_lossy(),
            extra,
            self.root().join("out").to_string_lossy(),
        );
        fs::write(&path, body).unwrap();
        path
    }

    fn pipeline(&self, extra: &str) -> Pipeline {
        let path = self.config(extra);
        let effective = EffectiveConfig::build(Some(&path), None).unwrap();
        Pipeline::new(effective.config).unwrap()
    }
}

#[test]
fn test_generate_writes_both_artifacts() {
    let dotfiles = Dotfiles::new();
    let (_, summary) = dotfiles.pipeline("").run(ExportTargets::default()).unwrap();

    let out = dotfiles.root().join("out");
    assert_eq!(summary.written, vec![out.join(JSON_FILE), out.join(JS_FILE)]);

    let js = fs::read_to_string(out.join(JS_FILE)).unwrap();
    assert!(js.contains("window.KEYBINDINGS_DATA = {"));

    let value: Value = serde_json::from_str(&fs::read_to_string(out.join(JSON_FILE)).unwrap()).unwrap();
    assert!(value["sourceFiles"]["karabiner"].as_str().unwrap().ends_with("karabiner.json"));
    assert!(value["sourceFiles"]["rectangle"].is_null());
    assert!(value["sourceFiles"]["raycast"].is_null());
    assert_eq!(value["layers"].as_object().unwrap().len(), 4);
}

#[test]
fn test_merged_layers() {
    let dotfiles = Dotfiles::new();
    let (export, _) = dotfiles.pipeline("").build().unwrap();

    let hyper = &export.layers[&LayerId::Hyper].bindings;
    let w = &hyper["w"];
    assert_eq!(w.action_label, "WS 3");
    assert_eq!(w.action_type, ActionType::Workspace);
    assert_eq!(w.description, "Browser workspace");

    let f = &hyper["f"];
    let variants = f.variants.as_ref().unwrap();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].condition, "tiling=1");
    assert_eq!(variants[0].action_label, "Float");
    assert_eq!(variants[1].condition, "tiling=0");
    assert_eq!(variants[1].action_label, "Max");

    let alt = &export.layers[&LayerId::Alt].bindings;
    // Karabiner outranks AeroSpace on a shared key
    assert_eq!(alt["h"].source, SourceId::Karabiner);
    assert_eq!(alt["h"].action_label, "Foc R");
    assert_eq!(alt["j"].source, SourceId::Aerospace);
    assert_eq!(alt["j"].description, "Look down");
    assert_eq!(alt["q"].source, SourceId::Aerospace);

    let alt_shift = &export.layers[&LayerId::AltShift].bindings;
    assert_eq!(alt_shift["7"].icon.data.as_deref(), Some("7"));

    assert!(export.layers[&LayerId::Service].bindings.contains_key("esc"));
}

#[test]
fn test_precedence_from_config() {
    let dotfiles = Dotfiles::new();
    let pipeline = dotfiles.pipeline("precedence = [\"aerospace\", \"karabiner\", \"rectangle\"]");
    let (export, _) = pipeline.build().unwrap();

    let h = &export.layers[&LayerId::Alt].bindings["h"];
    assert_eq!(h.source, SourceId::Aerospace);
    assert_eq!(h.action_label, "Foc L");
}

#[test]
fn test_runs_are_idempotent() {
    let dotfiles = Dotfiles::new();
    let pipeline = dotfiles.pipeline("");

    let (first, first_summary) = pipeline.build().unwrap();
    let (second, second_summary) = pipeline.build().unwrap();

    assert_eq!(first.layers, second.layers);
    assert_eq!(first_summary.layers_digest, second_summary.layers_digest);
    assert_eq!(
        serde_json::to_string(&first.layers).unwrap(),
        serde_json::to_string(&second.layers).unwrap()
    );
}

#[test]
fn test_malformed_source_does_not_stop_others() {
    let dotfiles = Dotfiles::new();
    dotfiles.write(".config/karabiner/karabiner.json", "{ not json");

    let (export, summary) = dotfiles.pipeline("").build().unwrap();

    assert_eq!(summary.sources[&SourceId::Karabiner], 0);
    assert!(export.layers[&LayerId::Hyper].bindings.is_empty());
    assert_eq!(export.layers[&LayerId::Alt].bindings["q"].source, SourceId::Aerospace);
    assert_eq!(export.layers[&LayerId::Alt].bindings["h"].source, SourceId::Aerospace);
}

#[test]
fn test_missing_cheatsheet_keeps_adapter_descriptions() {
    let dotfiles = Dotfiles::new();
    fs::remove_file(dotfiles.root().join("hammerspoon/cheatsheet.lua")).unwrap();

    let (export, _) = dotfiles.pipeline("").build().unwrap();
    assert_eq!(
        export.layers[&LayerId::Hyper].bindings["w"].description,
        "Summon workspace 3 to current monitor"
    );
}

#[test]
fn test_written_json_round_trips() {
    let dotfiles = Dotfiles::new();
    let (export, _) = dotfiles
        .pipeline("")
        .run(ExportTargets { json: true, js: false })
        .unwrap();

    let out = dotfiles.root().join("out");
    assert!(!out.join(JS_FILE).exists());
    let back: Export = serde_json::from_str(&fs::read_to_string(out.join(JSON_FILE)).unwrap()).unwrap();
    assert_eq!(back, export);
}

#[test]
fn test_cli_overrides_beat_user_config() {
    let dotfiles = Dotfiles::new();
    let path = dotfiles.config("");
    let override_dir = dotfiles.root().join("elsewhere");

    let effective = EffectiveConfig::build(
        Some(&path),
        Some(json!({"output": {"dir": override_dir.to_string_lossy(), "js": false}})),
    )
    .unwrap();
    assert_eq!(effective.sources.len(), 3);

    let pipeline = Pipeline::new(effective.config).unwrap();
    let output = &pipeline.config().output;
    let targets = ExportTargets {
        json: output.json,
        js: output.js,
    };
    let (_, summary) = pipeline.run(targets).unwrap();
    assert_eq!(summary.written, vec![override_dir.join(JSON_FILE)]);
}

#[test]
fn test_invalid_precedence_in_config_is_rejected() {
    let dotfiles = Dotfiles::new();
    let path = dotfiles.config("precedence = [\"karabiner\", \"karabiner\"]");
    assert!(EffectiveConfig::build(Some(&path), None).is_err());
}
