use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::event::{EventDispatcher, Handler, LevelChanged, PauseStateChanged, ScoreChanged};
use crate::game::GameInstance;

/// Text and indicator state of the heads-up display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudView {
    pub score_text: String,
    pub level_text: String,
    pub time_text: String,
    pub pause_visible: bool,
}

/// Keeps a [`HudView`] in sync with game instance events
///
/// Subscriptions live as long as the `Hud`; dropping it unsubscribes.
pub struct Hud {
    view: Rc<RefCell<HudView>>,
    dispatcher: Rc<EventDispatcher>,
    on_score: Handler<ScoreChanged>,
    on_level: Handler<LevelChanged>,
    on_pause: Handler<PauseStateChanged>,
}

impl Hud {
    pub fn attach(dispatcher: Rc<EventDispatcher>, instance: &GameInstance) -> Self {
        let view = Rc::new(RefCell::new(HudView::default()));

        let target = view.clone();
        let on_score = Handler::new("hud_score", move |e: &ScoreChanged| {
            target.borrow_mut().score_text = score_text(e.score);
            Ok(())
        });

        let target = view.clone();
        let on_level = Handler::new("hud_level", move |e: &LevelChanged| {
            target.borrow_mut().level_text = level_text(e.level);
            Ok(())
        });

        let target = view.clone();
        let on_pause = Handler::new("hud_pause", move |e: &PauseStateChanged| {
            target.borrow_mut().pause_visible = e.paused;
            Ok(())
        });

        dispatcher.subscribe(on_score.clone());
        dispatcher.subscribe(on_level.clone());
        dispatcher.subscribe(on_pause.clone());

        {
            let mut current = view.borrow_mut();
            current.score_text = score_text(instance.score());
            current.level_text = level_text(instance.level());
            current.time_text = time_text(instance.game_time());
            current.pause_visible = instance.is_paused();
        }
        debug!("HUD attached");

        Self {
            view,
            dispatcher,
            on_score,
            on_level,
            on_pause,
        }
    }

    pub fn view(&self) -> HudView {
        self.view.borrow().clone()
    }

    /// Refresh the clock; there is no event for time passing
    pub fn update_time(&self, game_time: f64) {
        self.view.borrow_mut().time_text = time_text(game_time);
    }
}

impl Drop for Hud {
    fn drop(&mut self) {
        self.dispatcher.unsubscribe(&self.on_score);
        self.dispatcher.unsubscribe(&self.on_level);
        self.dispatcher.unsubscribe(&self.on_pause);
        debug!("HUD detached");
    }
}

fn score_text(score: i32) -> String {
    let digits = score.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if score < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("Score: {grouped}")
}

fn level_text(level: i32) -> String {
    format!("Level: {level}")
}

fn time_text(game_time: f64) -> String {
    let total = game_time.max(0.0).floor() as u64;
    format!("Time: {:02}:{:02}", total / 60, total % 60)
}
