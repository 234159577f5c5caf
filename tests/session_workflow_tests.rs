mod utils;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use factorybase::event::{GameStateChanged, PauseStateChanged, ScoreChanged};
use factorybase::save::LoadOutcome;
use factorybase::{App, AppConfig, Hud, Saveable, State};
use serde::{Deserialize, Serialize};
use utils::{CallLog, TempSaveDir};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct WarehouseData {
    crates: u32,
    upgrades: Vec<String>,
}

#[derive(Default)]
struct Warehouse {
    data: WarehouseData,
}

impl Saveable for Warehouse {
    type Data = WarehouseData;

    fn save_key(&self) -> String {
        "warehouse".to_string()
    }

    fn save_data(&self) -> WarehouseData {
        self.data.clone()
    }

    fn load_save_data(&mut self, data: WarehouseData) {
        self.data = data;
    }
}

#[test]
fn fresh_session_starts_in_menu_with_defaults() {
    let dir = TempSaveDir::new();
    let app = App::new(dir.config());

    app.initialize();

    assert_eq!(app.game_state.current_state(), State::Menu);
    assert_eq!(app.game_instance.score(), 0);
    assert_eq!(app.game_instance.level(), 1);
    assert!(!app.save_manager.has_save_file());
}

#[test]
fn pausing_the_state_machine_pauses_the_instance_after_the_state_pass() {
    let dir = TempSaveDir::new();
    let app = App::new(dir.config());
    app.initialize();

    let log = CallLog::new();
    app.dispatcher
        .subscribe(log.describing::<GameStateChanged>("state", |e| e.current.to_string()));
    app.dispatcher
        .subscribe(log.describing::<PauseStateChanged>("pause", |e| e.paused.to_string()));
    let hud = Hud::attach(app.dispatcher.clone(), &app.game_instance);

    app.game_state.start_game();
    app.game_state.pause_game();

    // The pause flag is published from inside the state handler, so it lands after it
    assert_eq!(
        log.entries(),
        vec!["state:Playing", "state:Paused", "pause:true"]
    );
    assert!(app.game_instance.is_paused());
    assert!(hud.view().pause_visible);

    app.game_state.resume_game();
    assert!(!app.game_instance.is_paused());
    assert!(!hud.view().pause_visible);
}

#[test]
fn paused_session_does_not_advance_time() {
    let dir = TempSaveDir::new();
    let app = App::new(dir.config());
    app.initialize();
    app.game_state.start_game();

    app.tick(Duration::from_secs(2));
    app.game_state.pause_game();
    app.tick(Duration::from_secs(30));

    assert!((app.game_instance.game_time() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn progress_survives_shutdown_and_restart() {
    let dir = TempSaveDir::new();

    {
        let app = App::new(dir.config());
        let warehouse = Rc::new(RefCell::new(Warehouse::default()));
        app.save_registry.register_saveable(&warehouse);
        app.initialize();
        app.game_state.start_game();

        app.game_instance.add_score(2500);
        app.tick(Duration::from_secs(90));
        warehouse.borrow_mut().data = WarehouseData {
            crates: 12,
            upgrades: vec!["conveyor".to_string()],
        };

        app.shutdown().expect("shutdown should save");
        assert_eq!(app.dispatcher.subscriber_count::<GameStateChanged>(), 0);
    }

    let app = App::new(dir.config());
    let warehouse = Rc::new(RefCell::new(Warehouse::default()));
    app.save_registry.register_saveable(&warehouse);
    let log = CallLog::new();
    app.dispatcher
        .subscribe(log.describing::<ScoreChanged>("score", |e| e.score.to_string()));

    app.initialize();
    let hud = Hud::attach(app.dispatcher.clone(), &app.game_instance);

    assert_eq!(app.game_instance.score(), 2500);
    assert_eq!(app.game_instance.level(), 2);
    assert!((app.game_instance.game_time() - 90.0).abs() < f64::EPSILON);
    assert_eq!(warehouse.borrow().data.crates, 12);
    assert_eq!(log.entries(), vec!["score:0", "score:2500"]);
    assert_eq!(hud.view().score_text, "Score: 2,500");
    assert_eq!(hud.view().time_text, "Time: 01:30");
}

#[test]
fn autoload_disabled_ignores_existing_save() {
    let dir = TempSaveDir::new();
    {
        let app = App::new(dir.config());
        app.initialize();
        app.game_instance.set_score(700);
        app.shutdown().expect("shutdown should save");
    }

    let app = App::new(AppConfig {
        autoload: false,
        ..dir.config()
    });
    app.initialize();

    assert_eq!(app.game_instance.score(), 0);
    assert!(app.save_manager.has_save_file());
    assert!(matches!(
        app.save_manager.load_game(),
        Ok(LoadOutcome::Loaded { .. })
    ));
    assert_eq!(app.game_instance.score(), 700);
}

#[test]
fn corrupt_save_file_starts_fresh() {
    let dir = TempSaveDir::new();
    std::fs::create_dir_all(dir.path()).unwrap();
    std::fs::write(dir.config().save_file_path(), b"not a save file").unwrap();

    let app = App::new(dir.config());
    app.initialize();

    assert_eq!(app.game_instance.score(), 0);
    assert_eq!(app.game_state.current_state(), State::Menu);
}

#[test]
fn global_data_round_trips_through_the_save_file() {
    let dir = TempSaveDir::new();
    {
        let app = App::new(dir.config());
        app.initialize();
        app.save_registry
            .set_global_data("settings", "music_volume", &0.25_f64)
            .unwrap();
        app.shutdown().expect("shutdown should save");
    }

    let app = App::new(dir.config());
    app.initialize();

    assert_eq!(
        app.save_registry
            .get_global_data::<f64>("settings", "music_volume"),
        Some(0.25)
    );
    assert!(app.save_manager.save_file_info().starts_with("Last saved: "));
}
