//! Oil GUI session replay
//!
//! Builds a small widget tree and replays a scripted device session through
//! the collector, the desktop and the input manager.

use std::any::Any;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use oil_gui::config::GuiConfig;
use oil_gui::desktop::{BasicSurrogate, Desktop, DraggingSurrogate, HotKey};
use oil_gui::event::Modifiers;
use oil_gui::geometry::{Point, Rect, Size};
use oil_gui::input::{AttachmentType, InputCollector, InputManager, KeyCode, Scene};
use oil_gui::target::{DropEvent, EventTarget, KeyEvent, PointerButton, PointerEvent, TargetId};

const MOVE_FORWARD: usize = 0;
const TURN: usize = 1;
const FRAME_MS: u64 = 16;

#[derive(Parser)]
#[command(name = "replay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay a scripted input session", long_about = None)]
struct Cli {
    /// Configuration profile (debug, release, ...)
    #[arg(short, long, default_value = "release")]
    profile: String,

    /// Session to replay
    #[arg(short, long, value_enum, default_value_t = Scenario::Click)]
    scenario: Scenario,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    /// Click then double-click a button
    Click,
    /// Drag a tile into a bin
    Drag,
    /// Type into a field, fire a hot key and drive quantities
    Keys,
}

#[derive(Default)]
struct Button {
    clicks: usize,
    double_clicks: usize,
}

impl EventTarget for Button {
    fn name(&self) -> &str {
        "button"
    }

    fn tooltip(&self) -> Option<&str> {
        Some("Press me")
    }

    fn on_click(&mut self, _event: &PointerEvent) -> bool {
        self.clicks += 1;
        true
    }

    fn on_double_click(&mut self, _event: &PointerEvent) -> bool {
        self.double_clicks += 1;
        true
    }

    fn on_hot_key(&mut self, _event: &KeyEvent) -> bool {
        self.clicks += 1;
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Tile;

impl EventTarget for Tile {
    fn name(&self) -> &str {
        "tile"
    }

    fn on_drag_start(&mut self, start: Point) -> Option<Box<dyn DraggingSurrogate>> {
        info!(?start, "tile picked up");
        Some(Box::new(BasicSurrogate::new(Point::new(-8, -8))))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct Bin {
    received: Vec<TargetId>,
}

impl EventTarget for Bin {
    fn name(&self) -> &str {
        "bin"
    }

    fn accepts_drop(&self, _dragged: TargetId, _local: Point) -> bool {
        true
    }

    fn on_dropped(&mut self, event: &DropEvent) {
        self.received.push(event.dragged);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct Field {
    text: String,
}

impl EventTarget for Field {
    fn name(&self) -> &str {
        "field"
    }

    fn accepts_focus(&self) -> bool {
        true
    }

    fn on_character(&mut self, event: &KeyEvent) -> bool {
        self.text.extend(event.character);
        true
    }

    fn on_key_stroke(&mut self, event: &KeyEvent) -> bool {
        // Text keys belong to the field; movement keys fall through to the game
        event
            .key
            .is_some_and(|key| !matches!(key, KeyCode::W | KeyCode::UP))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Session {
    desktop: Desktop,
    collector: InputCollector,
    manager: InputManager,
    scene: Scene,
    time: u64,
}

impl Session {
    fn new(config: &GuiConfig) -> Result<Self> {
        let mut manager = InputManager::with_repeat(config.keyboard);
        manager.attach_key_global(MOVE_FORWARD, KeyCode::W, AttachmentType::KeyHold, 1)?;
        manager.attach_mouse_x_move_global(TURN, 1);

        let mut scene = Scene::new("menu");
        scene.attach_key(MOVE_FORWARD, KeyCode::UP, AttachmentType::KeyPressRepeat, 1)?;

        Ok(Self {
            desktop: Desktop::new(Size::new(800, 600), config.dispatch.clone()),
            collector: InputCollector::new(),
            manager,
            scene,
            time: 0,
        })
    }

    /// Runs one frame after `feed` delivered its device samples
    fn frame(
        &mut self,
        feed: impl FnOnce(&mut InputCollector) -> oil_gui::error::Result<()>,
    ) -> Result<()> {
        self.time += FRAME_MS;
        self.collector.set_time(self.time);
        feed(&mut self.collector)?;

        self.collector.flush_into(&mut self.desktop);
        let report = self.desktop.process_events();
        self.manager.update_filtered(
            self.collector.state(),
            Some(&self.scene),
            FRAME_MS,
            &report.consumed_keys,
        );
        if report.executed > 0 {
            info!(
                time = self.time,
                events = ?self.desktop.debug_last_events(),
                pointer = ?self.desktop.pointer_type(),
                "frame"
            );
        }
        self.collector.advance_frame();
        Ok(())
    }

    fn wait(&mut self, frames: usize) -> Result<()> {
        for _ in 0..frames {
            self.frame(|_| Ok(()))?;
        }
        Ok(())
    }

    fn click_at(&mut self, position: Point) -> Result<()> {
        self.frame(|c| {
            c.mouse_moved(position);
            c.mouse_button(PointerButton::Primary, true);
            Ok(())
        })?;
        self.frame(|c| {
            c.mouse_button(PointerButton::Primary, false);
            Ok(())
        })
    }
}

fn replay_click(session: &mut Session) -> Result<()> {
    let root = session.desktop.root();
    let button = session
        .desktop
        .insert(root, Button::default(), Rect::new(100, 100, 120, 32))?;

    session.click_at(Point::new(110, 110))?;
    session.wait(3)?;
    session.click_at(Point::new(111, 111))?;

    let button = session
        .desktop
        .tree()
        .get_as::<Button>(button)
        .context("button vanished")?;
    info!(
        clicks = button.clicks,
        double_clicks = button.double_clicks,
        "click session finished"
    );
    Ok(())
}

fn replay_drag(session: &mut Session) -> Result<()> {
    let root = session.desktop.root();
    let tile = session
        .desktop
        .insert(root, Tile, Rect::new(50, 50, 40, 40))?;
    let bin = session
        .desktop
        .insert(root, Bin::default(), Rect::new(400, 50, 120, 120))?;

    session.frame(|c| {
        c.mouse_moved(Point::new(60, 60));
        c.mouse_button(PointerButton::Primary, true);
        Ok(())
    })?;
    for step in 1..=10 {
        session.frame(|c| {
            c.mouse_moved(Point::new(60 + step * 40, 60 + step * 4));
            Ok(())
        })?;
    }
    session.frame(|c| {
        c.mouse_button(PointerButton::Primary, false);
        Ok(())
    })?;

    let received = &session
        .desktop
        .tree()
        .get_as::<Bin>(bin)
        .context("bin vanished")?
        .received;
    if received.contains(&tile) {
        info!(?tile, "tile landed in the bin");
    } else {
        warn!(?tile, "tile was not dropped");
    }
    Ok(())
}

fn replay_keys(session: &mut Session) -> Result<()> {
    let root = session.desktop.root();
    let field = session
        .desktop
        .insert(root, Field::default(), Rect::new(20, 20, 200, 24))?;
    let button = session
        .desktop
        .insert(root, Button::default(), Rect::new(240, 20, 80, 24))?;
    session
        .desktop
        .register_hot_key(HotKey::new('s', Modifiers::CTRL), button)?;

    session.click_at(Point::new(30, 30))?;
    for ch in "oil".chars() {
        session.frame(|c| {
            c.key_down(KeyCode::A)?;
            c.character(ch);
            c.key_up(KeyCode::A)
        })?;
    }
    session.frame(|c| {
        c.key_down(KeyCode::LEFT_CTRL)?;
        c.character('s');
        c.key_up(KeyCode::LEFT_CTRL)
    })?;

    // Held movement keys reach the quantity layer past the focused field
    session.frame(|c| c.key_down(KeyCode::W))?;
    session.frame(|c| c.key_down(KeyCode::UP))?;
    session.wait(40)?;
    session.frame(|c| {
        c.key_up(KeyCode::W)?;
        c.key_up(KeyCode::UP)?;
        c.mouse_moved(Point::new(90, 30));
        Ok(())
    })?;

    let text = &session
        .desktop
        .tree()
        .get_as::<Field>(field)
        .context("field vanished")?
        .text;
    info!(
        text = %text,
        hot_key_presses = session.desktop.tree().get_as::<Button>(button).map_or(0, |b| b.clicks),
        move_forward = session.manager.get_event_quantity(MOVE_FORWARD),
        turn = session.manager.get_event_quantity(TURN),
        "key session finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = GuiConfig::load(&cli.profile)
        .with_context(|| format!("failed to load profile {}", cli.profile))?;
    info!(profile = config.profile, scenario = ?cli.scenario, "replaying session");

    let mut session = Session::new(&config)?;
    match cli.scenario {
        Scenario::Click => replay_click(&mut session),
        Scenario::Drag => replay_drag(&mut session),
        Scenario::Keys => replay_keys(&mut session),
    }
}
