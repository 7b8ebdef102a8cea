//! Declarative property animations.
//!
//! An [`AnimationDescriptor`] in an object's `animations` list becomes an
//! [`AnimationRun`] once bound. A run without a trigger starts as soon as
//! it is bound; a run with a trigger is armed and (re)starts every time the
//! trigger channel fires.
//!
//! ```text
//! Idle ─┬─ trigger ──▶ Armed ──fire──┐
//!       └─ no trigger ───────────────┴─▶ Scheduled ──delay──▶ Running ─┬─▶ Completed
//!                                                                     └─▶ Aborted
//! ```
//!
//! `from`/`to` snapshots are taken when the delay timer fires, not when the
//! run starts. Stepping happens in [`Canvas::tick`]; while the canvas is in
//! the middle of an interactive selection every running tween aborts and
//! leaves the values where they are. Removing a descriptor flags its run;
//! a tween in flight stops at its next step.

use crate::canvas::{Canvas, OBJECT_MODIFIED};
use crate::config::AnimationStrategy;
use crate::easing::Easing;
use crate::error::{FxError, FxResult};
use crate::geometry::{Origin, OriginX, OriginY};
use crate::id::ObjectId;
use crate::listeners::{ListenerId, ObjectHandler};
use crate::object::OriginSnapshot;
use crate::observed::Observer;
use crate::property::{self, Property, PropertySet};
use crate::timer::{TimerAction, TimerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slotmap::new_key_type;
use std::rc::Rc;

new_key_type! {
    /// Handle for a live animation run.
    pub struct RunId;
}

// ─── Descriptor ───────────────────────────────────────────────────────────

/// A declarative animation. Every field is optional and absent fields stay
/// absent on export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDescriptor {
    /// Named animation factory in the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Object channel that (re)starts the animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// Free-form payload for factories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PropertySet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PropertySet>,
    /// Milliseconds before the first leg. Default 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    /// Milliseconds per leg. Default from [`CanvasOptions`](crate::CanvasOptions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Number of legs; 0 loops forever. Absent means one leg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<u32>,
    /// Ping-pong between `to` and `from` instead of restarting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<OriginX>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<OriginY>,
}

impl AnimationDescriptor {
    /// A tween toward `to`.
    pub fn tween(to: impl IntoIterator<Item = (Property, f64)>) -> Self {
        Self {
            to: Some(to.into_iter().collect()),
            ..Default::default()
        }
    }

    /// A descriptor resolved through the registry factory `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn starting_at(mut self, from: impl IntoIterator<Item = (Property, f64)>) -> Self {
        self.from = Some(from.into_iter().collect());
        self
    }

    pub fn on_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    pub fn with_duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn with_delay(mut self, ms: f64) -> Self {
        self.delay = Some(ms);
        self
    }

    pub fn repeat(mut self, times: u32) -> Self {
        self.times = Some(times);
        self
    }

    pub fn reversing(mut self) -> Self {
        self.reverse = Some(true);
        self
    }

    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin_x = Some(origin.x);
        self.origin_y = Some(origin.y);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Anchor a run translates its object to, if the descriptor names one.
/// A missing axis keeps the object's current anchor.
fn resolve_origin(x: Option<OriginX>, y: Option<OriginY>, current: Origin) -> Option<Origin> {
    if x.is_none() && y.is_none() {
        return None;
    }
    Some(Origin::new(x.unwrap_or(current.x), y.unwrap_or(current.y)))
}

/// Validated timing of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Timing {
    delay: f64,
    duration: f64,
    easing: Easing,
}

impl Timing {
    fn resolve(descriptor: &AnimationDescriptor, default_duration: f64) -> FxResult<Self> {
        let delay = non_negative("delay", descriptor.delay.unwrap_or(0.0))?;
        let duration = non_negative("duration", descriptor.duration.unwrap_or(default_duration))?;
        let easing = match &descriptor.easing {
            Some(name) => name
                .parse()
                .map_err(|e: FxError| FxError::InvalidAnimationDescriptor(e.to_string()))?,
            None => Easing::Linear,
        };
        Ok(Self {
            delay,
            duration,
            easing,
        })
    }
}

fn non_negative(field: &str, value: f64) -> FxResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FxError::InvalidAnimationDescriptor(format!(
            "{field} must be a finite, non-negative number of milliseconds (got {value})"
        )))
    }
}

// ─── Runs ─────────────────────────────────────────────────────────────────

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    /// Waiting for its trigger.
    Armed,
    /// Delay timer pending.
    Scheduled,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone)]
struct Tween {
    started_ms: f64,
    start: PropertySet,
    end: PropertySet,
}

/// Runtime state of one bound animation slot.
#[derive(Debug, Clone)]
pub(crate) struct AnimationRun {
    owner: ObjectId,
    descriptor: AnimationDescriptor,
    timing: Timing,
    pub(crate) iteration: u32,
    /// Set once the descriptor is removed.
    abort: bool,
    from: Option<PropertySet>,
    to: PropertySet,
    pub(crate) phase: RunPhase,
    timer: Option<TimerId>,
    tween: Option<Tween>,
    shadow: Option<ObjectId>,
}

impl AnimationRun {
    fn new(owner: ObjectId, descriptor: AnimationDescriptor, timing: Timing) -> Self {
        Self {
            owner,
            descriptor,
            timing,
            iteration: 0,
            abort: false,
            from: None,
            to: PropertySet::new(),
            phase: RunPhase::Idle,
            timer: None,
            tween: None,
            shadow: None,
        }
    }

    /// The object the tween writes to.
    fn target(&self) -> ObjectId {
        self.shadow.unwrap_or(self.owner)
    }

    pub(crate) fn shadow(&self) -> Option<ObjectId> {
        self.shadow
    }
}

/// Registration kept for a bound animation descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationBinding {
    pub run: RunId,
    /// Trigger subscription, for triggered animations.
    pub listener: Option<ListenerId>,
}

// ─── Binder ───────────────────────────────────────────────────────────────

/// Binds animation descriptors of `target` while it lives on `canvas`.
pub(crate) struct AnimationBinder<'a> {
    pub canvas: &'a mut Canvas,
    pub target: ObjectId,
}

impl Observer<AnimationDescriptor> for AnimationBinder<'_> {
    type Handle = AnimationBinding;
    type Error = FxError;

    fn on_insert(
        &mut self,
        index: usize,
        descriptor: &AnimationDescriptor,
    ) -> Result<Option<AnimationBinding>, FxError> {
        let canvas = &mut *self.canvas;
        if canvas.selection_in_progress() {
            log::debug!("{}: animation #{index} left unbound during selection", self.target);
            return Ok(None);
        }

        let obj = canvas
            .object(self.target)
            .ok_or(FxError::ObjectNotFound(self.target))?;
        let effective = match descriptor.name.as_deref().and_then(|n| canvas.registry().animation(n)) {
            Some(factory) => factory(obj, descriptor),
            None => descriptor.clone(),
        };
        let timing = Timing::resolve(&effective, canvas.options().default_duration_ms)
            .inspect_err(|e| log::warn!("{}: rejected animation #{index}: {e}", self.target))?;

        canvas.fire(OBJECT_MODIFIED, Some(self.target));

        let trigger = effective.trigger.clone();
        let run = canvas
            .runs
            .insert(AnimationRun::new(self.target, effective, timing));

        let listener = match trigger {
            Some(trigger) => {
                let start: ObjectHandler = Rc::new(move |canvas, _, _| canvas.start_run(run));
                let obj = canvas
                    .object_mut(self.target)
                    .ok_or(FxError::ObjectNotFound(self.target))?;
                let listener = obj.listeners.on(&trigger, start);
                if let Some(state) = canvas.runs.get_mut(run) {
                    state.phase = RunPhase::Armed;
                }
                log::debug!("{}: animation #{index} armed on {trigger:?}", self.target);
                Some(listener)
            }
            None => {
                canvas.start_run(run);
                None
            }
        };
        Ok(Some(AnimationBinding { run, listener }))
    }

    fn on_remove(&mut self, index: usize, _descriptor: &AnimationDescriptor, binding: AnimationBinding) {
        let canvas = &mut *self.canvas;
        canvas.teardown_run(binding.run);
        if let Some(listener) = binding.listener
            && let Some(obj) = canvas.object_mut(self.target)
        {
            obj.listeners.off(listener);
        }
        log::debug!("{}: animation #{index} removed", self.target);
        canvas.fire(OBJECT_MODIFIED, Some(self.target));
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────

impl Canvas {
    /// (Re)start a run: reset its state, retranslate the owner to the
    /// descriptor origin and schedule the delay timer.
    pub(crate) fn start_run(&mut self, run_id: RunId) {
        let Some(run) = self.runs.get_mut(run_id) else {
            return;
        };
        if run.abort {
            return;
        }
        if let Some(timer) = run.timer.take() {
            self.timers.cancel(timer);
        }
        let shadow = run.shadow.take();
        run.iteration = 0;
        run.from = None;
        run.tween = None;
        let owner = run.owner;
        let delay = run.timing.delay;
        let (origin_x, origin_y) = (run.descriptor.origin_x, run.descriptor.origin_y);

        if let Some(obj) = self.scene.get_mut(owner) {
            if obj.before_animation.is_none() {
                obj.before_animation = Some(OriginSnapshot {
                    origin: obj.origin,
                    angle: obj.angle,
                });
            }
            if let Some(origin) = resolve_origin(origin_x, origin_y, obj.origin) {
                obj.set_origin_keep_position(origin);
            }
        }

        let timer = self
            .timers
            .schedule(self.now_ms + delay, TimerAction::FireRun(run_id));
        if let Some(run) = self.runs.get_mut(run_id) {
            run.timer = Some(timer);
            run.phase = RunPhase::Scheduled;
        }
        if let Some(shadow) = shadow {
            self.drop_shadow(owner, shadow);
        }
        log::debug!("{owner}: run scheduled in {delay}ms");
    }

    /// Delay elapsed: snapshot `from`/`to` and begin the first leg.
    pub(crate) fn fire_run(&mut self, run_id: RunId) {
        let Some(run) = self.runs.get_mut(run_id) else {
            return;
        };
        run.timer = None;
        let owner = run.owner;

        if self.options.strategy == AnimationStrategy::ShadowClone
            && let Some(shadow) = self.spawn_shadow(owner)
            && let Some(run) = self.runs.get_mut(run_id)
        {
            run.shadow = Some(shadow);
        }

        let Some(run) = self.runs.get(run_id) else {
            return;
        };
        let target = run.target();
        let to = run.descriptor.to.clone().unwrap_or_default();
        let explicit_from = run.descriptor.from.clone();
        let Some(obj) = self.scene.get_mut(target) else {
            return;
        };
        let from = explicit_from.unwrap_or_else(|| property::pick(obj, to.keys()));
        property::apply(obj, &from);

        if let Some(run) = self.runs.get_mut(run_id) {
            run.from = Some(from);
            run.to = to.clone();
        }
        self.begin_leg(run_id, to);
    }

    /// Tween the run's target from its current values toward `end`.
    fn begin_leg(&mut self, run_id: RunId, end: PropertySet) {
        let Some(run) = self.runs.get(run_id) else {
            return;
        };
        let Some(obj) = self.scene.get(run.target()) else {
            return;
        };
        let start = property::pick(obj, end.keys());
        let started_ms = self.now_ms;
        if let Some(run) = self.runs.get_mut(run_id) {
            run.tween = Some(Tween {
                started_ms,
                start,
                end,
            });
            run.phase = RunPhase::Running;
        }
        self.request_redraw();
    }

    /// Advance every running tween to `self.now_ms`.
    pub(crate) fn step_runs(&mut self) {
        let running: Vec<RunId> = self
            .runs
            .iter()
            .filter(|(_, run)| run.phase == RunPhase::Running)
            .map(|(id, _)| id)
            .collect();
        for run_id in running {
            self.step_run(run_id);
        }
    }

    fn step_run(&mut self, run_id: RunId) {
        let selection = self.selection_in_progress;
        let now = self.now_ms;
        let Some(run) = self.runs.get_mut(run_id) else {
            return;
        };
        if run.phase != RunPhase::Running {
            return;
        }
        if run.abort {
            let owner = run.owner;
            self.runs.remove(run_id);
            log::debug!("{owner}: removed run stopped");
            return;
        }
        if selection {
            run.phase = RunPhase::Aborted;
            run.tween = None;
            let owner = run.owner;
            log::debug!("{owner}: run aborted");
            if let Some(shadow) = run.shadow.take() {
                self.drop_shadow(owner, shadow);
            }
            return;
        }
        let Some(tween) = &run.tween else {
            return;
        };
        let duration = run.timing.duration;
        let t = if duration <= 0.0 {
            1.0
        } else {
            ((now - tween.started_ms) / duration).clamp(0.0, 1.0)
        };
        let eased = run.timing.easing.apply(t);
        let values: PropertySet = tween
            .end
            .iter()
            .map(|(prop, end)| {
                let start = tween.start.get(prop).copied().unwrap_or(*end);
                (*prop, start + (end - start) * eased)
            })
            .collect();
        let target = run.target();
        if let Some(obj) = self.scene.get_mut(target) {
            property::apply(obj, &values);
            log::trace!("{target}: t={t:.3} {values:?}");
        }
        self.request_redraw();
        if t >= 1.0 {
            self.complete_leg(run_id);
        }
    }

    /// A leg reached its end: loop, ping-pong, or finish.
    fn complete_leg(&mut self, run_id: RunId) {
        let Some(run) = self.runs.get_mut(run_id) else {
            return;
        };
        run.iteration += 1;
        run.tween = None;
        let iteration = run.iteration;
        let from = run.from.clone().unwrap_or_default();
        let to = run.to.clone();
        let reverse = run.descriptor.reverse.unwrap_or(false);
        let owner = run.owner;
        let target = run.target();

        let again = match run.descriptor.times {
            Some(0) => true,
            Some(times) => iteration < times,
            None => false,
        };
        if !again {
            run.phase = RunPhase::Completed;
            let shadow = run.shadow.take();
            log::debug!("{owner}: run completed after {iteration} leg(s)");
            if let Some(shadow) = shadow {
                self.drop_shadow(owner, shadow);
            }
            return;
        }

        if reverse {
            let end = if iteration % 2 == 0 { to } else { from };
            self.begin_leg(run_id, end);
        } else {
            if let Some(obj) = self.scene.get_mut(target) {
                property::apply(obj, &from);
            }
            self.begin_leg(run_id, to);
        }
    }

    /// Stop a run for good: cancel its timer, put `from` back and release
    /// its shadow. A running tween is only flagged; its next step drops it.
    pub(crate) fn teardown_run(&mut self, run_id: RunId) {
        let Some(run) = self.runs.get_mut(run_id) else {
            return;
        };
        run.abort = true;
        let timer = run.timer.take();
        let shadow = run.shadow.take();
        let from = run.from.take();
        let (owner, phase) = (run.owner, run.phase);
        if phase != RunPhase::Running {
            self.runs.remove(run_id);
        }
        if let Some(timer) = timer {
            self.timers.cancel(timer);
        }
        match shadow {
            Some(shadow) => self.drop_shadow(owner, shadow),
            None => {
                if let Some(from) = &from
                    && let Some(obj) = self.scene.get_mut(owner)
                {
                    property::apply(obj, from);
                }
            }
        }
        log::debug!("{owner}: run torn down in phase {phase:?}");
    }

    /// Place a clone of `owner` right above it and hide the original.
    fn spawn_shadow(&mut self, owner: ObjectId) -> Option<ObjectId> {
        let idx = self.scene.index_of(owner)?;
        let parent = self.scene.parent(idx)?;
        let pos = self.scene.z_index(idx)?;
        let obj = self.scene.get_mut(owner)?;
        let shadow = obj.shadow_copy();
        obj.visible = false;
        let id = shadow.id;
        self.scene.insert_at(parent, pos + 1, shadow);
        log::debug!("{owner}: shadow {id} spawned");
        Some(id)
    }

    /// Remove a shadow clone and show the original again.
    fn drop_shadow(&mut self, owner: ObjectId, shadow: ObjectId) {
        if let Some(idx) = self.scene.index_of(shadow) {
            self.scene.remove_node(idx);
        }
        if let Some(obj) = self.scene.get_mut(owner) {
            obj.visible = true;
        }
        self.request_redraw();
    }

    /// Phase of the run bound to `animations[index]` of `id`.
    pub fn run_phase(&self, id: ObjectId, index: usize) -> Option<RunPhase> {
        let binding = self.object(id)?.animations.handle(index)?;
        self.runs.get(binding.run).map(|run| run.phase)
    }

    /// Completed legs of the run bound to `animations[index]` of `id`.
    pub fn run_iteration(&self, id: ObjectId, index: usize) -> Option<u32> {
        let binding = self.object(id)?.animations.handle(index)?;
        self.runs.get(binding.run).map(|run| run.iteration)
    }

    /// Shadow clone currently tweened in place of `animations[index]` of `id`.
    pub fn run_shadow(&self, id: ObjectId, index: usize) -> Option<ObjectId> {
        let binding = self.object(id)?.animations.handle(index)?;
        self.runs.get(binding.run)?.shadow()
    }
}
