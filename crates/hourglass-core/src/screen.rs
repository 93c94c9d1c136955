//! The hourglass screen.
//!
//! Owns the countdown engine and the tilt listener, and follows the screen
//! lifecycle:
//!
//! ```text
//! create -> resume -> (start / reset / samples / ticks)* -> pause -> destroy
//! ```
//!
//! Bulb levels survive the process through the [`PersistentStore`]. Whether a
//! run was initiated and whether the timer was running survive only a
//! recreation (rotation) through [`InstanceState`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::alarm::{self, AlarmClock};
use crate::error::Result;
use crate::events::Event;
use crate::notify::NotificationPermission;
use crate::render::{Bulb, Orientation, RenderSurface, SandRenderer};
use crate::sensor::{
    AccelSample, CountdownControl, OrientationListener, OrientationSource, SensorEvent,
    SensorKind, TiltThresholds,
};
use crate::storage::{load_sandglass, save_sandglass, Config, PersistentStore};
use crate::timer::{CountdownEngine, CountdownState, Direction, Sandglass};

/// Source of wall-clock time, epoch milliseconds.
pub trait WallClock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_ms(&self) -> i64 {
        alarm::now_ms()
    }
}

/// Enabled state of the two buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub start_enabled: bool,
    pub reset_enabled: bool,
}

/// Snapshot carried across a recreation of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceState {
    #[serde(rename = "iS")]
    pub run_initiated: bool,
    #[serde(rename = "tR")]
    pub timer_running: bool,
    /// Direction of the running timer. Older snapshots lack it; they resume
    /// forward.
    #[serde(rename = "dir", default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

struct Session<B, S, C> {
    backend: B,
    surface: S,
    clock: C,
    engine: CountdownEngine,
    renderer: SandRenderer,
    orientation: Orientation,
    run_initiated: bool,
    controls: Controls,
}

impl<B, S, C> Session<B, S, C>
where
    B: PersistentStore + AlarmClock,
    S: RenderSurface,
    C: WallClock,
{
    fn render(&mut self) {
        let glass = *self.engine.glass();
        self.renderer.render(
            &mut self.surface,
            Bulb::Upper,
            glass.remaining_ms(),
            self.orientation,
        );
        self.renderer.render(
            &mut self.surface,
            Bulb::Lower,
            glass.elapsed_ms(),
            self.orientation,
        );
    }
}

impl<B, S, C> CountdownControl for Session<B, S, C>
where
    B: PersistentStore + AlarmClock,
    S: RenderSurface,
    C: WallClock,
{
    fn run_initiated(&self) -> bool {
        self.run_initiated
    }

    fn timer_active(&self) -> bool {
        self.engine.is_active()
    }

    fn start_countdown(&mut self, direction: Direction) -> Result<Vec<Event>> {
        let now_ms = self.clock.now_ms();
        let Some(started) = self.engine.start(direction, now_ms) else {
            return Ok(Vec::new());
        };
        self.backend.arm(started.fire_at_ms)?;
        let at = Utc::now();
        Ok(vec![
            Event::CountdownStarted {
                direction: started.direction,
                duration_ms: started.duration_ms,
                fire_at_ms: started.fire_at_ms,
                at,
            },
            Event::AlarmArmed {
                fire_at_ms: started.fire_at_ms,
                at,
            },
        ])
    }

    fn stop_countdown(&mut self) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self.engine.cancel().into_iter().collect();
        self.backend.disarm()?;
        events.push(Event::AlarmDisarmed { at: Utc::now() });
        Ok(events)
    }
}

/// The single screen of the app.
pub struct Hourglass<B, S, C = SystemClock> {
    listener: OrientationListener,
    session: Session<B, S, C>,
}

impl<B, S, C> Hourglass<B, S, C>
where
    B: PersistentStore + AlarmClock,
    S: RenderSurface,
    C: WallClock,
{
    /// Build the screen: load the bulbs, draw them, restore `saved` if this
    /// is a recreation.
    pub fn create(
        backend: B,
        surface: S,
        clock: C,
        config: &Config,
        orientation: Orientation,
        saved: Option<InstanceState>,
    ) -> Result<Self> {
        tracing::info!(?orientation, restored = saved.is_some(), "screen created");
        let capacity_ms = config.countdown.initial_ms;
        let glass = load_sandglass(&backend, capacity_ms)?;

        let mut session = Session {
            backend,
            surface,
            clock,
            engine: CountdownEngine::new(glass, config.countdown.tick_ms),
            renderer: SandRenderer::new(capacity_ms, config.render.max_sand_px),
            orientation,
            run_initiated: false,
            controls: Controls {
                start_enabled: true,
                reset_enabled: !glass.is_full(),
            },
        };
        session.render();

        if let Some(saved) = saved {
            session.run_initiated = saved.run_initiated;
            if saved.run_initiated {
                session.controls = Controls {
                    start_enabled: false,
                    reset_enabled: false,
                };
            }
            if saved.timer_running {
                let direction = saved.direction.unwrap_or(Direction::Forward);
                session.start_countdown(direction)?;
            }
        }

        Ok(Self {
            listener: OrientationListener::new(TiltThresholds::new(config.sensor.tilt_threshold)),
            session,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn controls(&self) -> Controls {
        self.session.controls
    }

    pub fn run_initiated(&self) -> bool {
        self.session.run_initiated
    }

    pub fn timer_active(&self) -> bool {
        self.session.engine.is_active()
    }

    pub fn state(&self) -> CountdownState {
        self.session.engine.state()
    }

    pub fn glass(&self) -> &Sandglass {
        self.session.engine.glass()
    }

    pub fn tick_ms(&self) -> i64 {
        self.session.engine.tick_ms()
    }

    pub fn orientation(&self) -> Orientation {
        self.session.orientation
    }

    pub fn last_sample(&self) -> Option<AccelSample> {
        self.listener.last_sample()
    }

    pub fn backend(&self) -> &B {
        &self.session.backend
    }

    pub fn surface(&self) -> &S {
        &self.session.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.session.surface
    }

    pub fn snapshot(&self) -> Event {
        self.session.engine.snapshot()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Back in the foreground. Asks for the notification permission when it
    /// has not been granted.
    pub fn resume<P: NotificationPermission + ?Sized>(&self, permission: &P) -> Option<Event> {
        tracing::info!("screen resumed");
        if permission.is_granted() {
            return None;
        }
        tracing::info!("requesting notification permission");
        Some(Event::PermissionRequested { at: Utc::now() })
    }

    /// Leaving the foreground: persist both bulbs.
    pub fn pause(&self) -> Result<()> {
        tracing::info!("screen paused");
        save_sandglass(&self.session.backend, self.session.engine.glass())
    }

    pub fn save_instance_state(&self) -> InstanceState {
        InstanceState {
            run_initiated: self.session.run_initiated,
            timer_running: self.session.engine.is_active(),
            direction: self.session.engine.state().direction(),
        }
    }

    /// Tear down: stop ticking and disarm the alarm. Hands the capabilities
    /// back so a recreated screen can reuse them.
    pub fn destroy(mut self) -> Result<(B, S, C)> {
        tracing::info!("screen destroyed");
        self.session.engine.cancel();
        self.session.backend.disarm()?;
        let Session {
            backend,
            surface,
            clock,
            ..
        } = self.session;
        Ok((backend, surface, clock))
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Start button. The direction comes from the last accelerometer sample;
    /// if the device is level the run is initiated and the listener starts
    /// the timer once it is tilted.
    pub fn press_start(&mut self) -> Result<Vec<Event>> {
        if !self.session.controls.start_enabled {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        let flow = self
            .listener
            .last_sample()
            .and_then(|sample| self.listener.thresholds().flow(&sample));
        if let Some(direction) = flow {
            events.extend(self.session.start_countdown(direction)?);
        }
        self.session.controls = Controls {
            start_enabled: false,
            reset_enabled: false,
        };
        self.session.run_initiated = true;
        tracing::info!(?flow, "run initiated");
        Ok(events)
    }

    /// Reset button. Ignored while disabled or while a run is initiated.
    pub fn press_reset(&mut self) -> Result<Vec<Event>> {
        if !self.session.controls.reset_enabled || self.session.run_initiated {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        if self.session.engine.is_active() {
            events.extend(self.session.stop_countdown()?);
        }
        events.extend(self.session.engine.reset());
        self.session.controls = Controls {
            start_enabled: true,
            reset_enabled: false,
        };
        self.session.run_initiated = false;
        self.session.render();
        Ok(events)
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn on_sensor_changed(&mut self, event: &SensorEvent) -> Result<Vec<Event>> {
        self.listener.on_sensor_changed(event, &mut self.session)
    }

    pub fn on_accuracy_changed(&self, kind: SensorKind, accuracy: i32) {
        self.listener.on_accuracy_changed(kind, accuracy);
    }

    /// Feed every pending event from `source`.
    pub fn pump<O: OrientationSource + ?Sized>(&mut self, source: &mut O) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        while let Some(event) = source.next_event() {
            events.extend(self.on_sensor_changed(&event)?);
        }
        Ok(events)
    }

    /// One tick of the countdown, then redraw both bulbs.
    pub fn tick(&mut self) -> Option<Event> {
        let event = self.session.engine.tick()?;
        self.session.render();
        Some(event)
    }
}
