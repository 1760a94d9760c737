use std::path::Path;

use egui::pos2;
use egui_ddlist::app::ArrangerApp;
use egui_ddlist::mod_settings::ModSettings;
use egui_ddlist::profiles::GamePaths;
use egui_ddlist::{EventDispatcher, ListLayout, PointerListener};

const SETTINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<save>
    <region id="ModuleSettings">
        <node id="root">
            <children>
                <node id="ModOrder">
                    <children>
                        <node id="Module"><attribute id="UUID" value="uuid-a" type="FixedString"/></node>
                        <node id="Module"><attribute id="UUID" value="uuid-b" type="FixedString"/></node>
                        <node id="Module"><attribute id="UUID" value="uuid-c" type="FixedString"/></node>
                    </children>
                </node>
                <node id="Mods">
                    <children>
                        <node id="ModuleShortDesc">
                            <attribute id="Name" value="Alpha" type="FixedString"/>
                            <attribute id="UUID" value="uuid-a" type="FixedString"/>
                        </node>
                    </children>
                </node>
            </children>
        </node>
    </region>
</save>
"#;

fn layout() -> ListLayout {
    ListLayout {
        item_width: 300.0,
        item_height: 20.0,
        offset_x: 10.0,
        offset_y: 10.0,
        gap: 10.0,
        ..ListLayout::default()
    }
}

fn game_dir(root: &Path, profiles: &[&str]) -> GamePaths {
    let paths = GamePaths::new(root);
    for profile in profiles {
        let dir = paths.profiles_dir().join(profile);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(paths.mod_settings_path(profile), SETTINGS).unwrap();
    }
    std::fs::create_dir_all(paths.mods_dir()).unwrap();
    std::fs::write(paths.mods_dir().join("Charlie_uuid-c.pak"), "").unwrap();
    paths
}

fn uuids(app: &ArrangerApp) -> Vec<String> {
    app.list()
        .unwrap()
        .values()
        .map(|entry| entry.uuid.clone())
        .collect()
}

#[test]
fn drag_and_save_rewrites_load_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths = game_dir(dir.path(), &["Player"]);
    let settings_path = paths.mod_settings_path("Player");

    let mut app = ArrangerApp::new(paths, layout(), None).unwrap();
    assert_eq!(app.current_profile(), Some("Player"));
    assert_eq!(uuids(&app), ["uuid-a", "uuid-b", "uuid-c"]);

    // drag the first mod onto the last row
    let mut dispatcher = EventDispatcher::new();
    dispatcher.press(pos2(50.0, 15.0));
    dispatcher.motion(pos2(50.0, 80.0));
    dispatcher.release(pos2(50.0, 80.0));
    let list = app.list_mut().unwrap();
    let listener: &mut dyn PointerListener = list;
    assert_eq!(dispatcher.dispatch(&mut [listener]), 3);

    assert_eq!(uuids(&app), ["uuid-b", "uuid-c", "uuid-a"]);
    app.save().unwrap();
    assert_eq!(app.last_error(), None);

    let saved = ModSettings::load(&settings_path).unwrap();
    let order: Vec<&str> = saved.order().iter().map(|m| m.uuid.as_str()).collect();
    assert_eq!(order, ["uuid-b", "uuid-c", "uuid-a"]);
    assert_eq!(saved.display_name("uuid-a"), "Alpha");
}

#[test]
fn several_profiles_wait_for_a_choice() {
    let dir = tempfile::tempdir().unwrap();
    let paths = game_dir(dir.path(), &["One", "Two"]);

    let mut app = ArrangerApp::new(paths, layout(), None).unwrap();
    assert_eq!(app.profiles(), ["One", "Two"]);
    assert!(app.list().is_none());
    assert!(app.save().is_err());

    app.open_profile(1);
    assert_eq!(app.current_profile(), Some("Two"));
    assert_eq!(app.list().unwrap().len(), 3);
}

#[test]
fn unknown_profile_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let paths = game_dir(dir.path(), &["One"]);
    assert!(ArrangerApp::new(paths, layout(), Some("Missing")).is_err());
}

#[test]
fn broken_settings_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let paths = game_dir(dir.path(), &["One"]);
    std::fs::write(paths.mod_settings_path("One"), "<save>").unwrap();

    let app = ArrangerApp::new(paths, layout(), None).unwrap();
    assert!(app.list().is_none());
    assert!(app.last_error().unwrap().contains("Invalid XML"));
}
