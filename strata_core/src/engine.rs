// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rotation engine and public facade.
//!
//! [`Stacker`] owns the layer stack, the gallery sequence, the rotation
//! state, and the transition chain for its whole lifetime. It is a pure
//! state machine: every operation returns a
//! [`StackChanges`](crate::changes::StackChanges) batch for the backend to
//! apply, and asynchronous outcomes flow back in through
//! [`fade_finished`](Stacker::fade_finished) and
//! [`rotation_tick`](Stacker::rotation_tick).
//!
//! # Transition protocol
//!
//! A show request fades every layer except the target to 0 and the target
//! to 1, then *watches* the target's fade-in. Only that completion fires
//! the [`ImageShown`](crate::event::StackEvent::ImageShown) notification
//! and releases queued operations. Issuing another show mid-flight
//! supersedes the watched transition: the layer generations advance (so
//! the old completion is void) and the queued continuations are discarded.
//! [`show_default`](Stacker::show_default) instead watches *all* layers
//! under a count-down barrier and completes only when every fade-out has
//! settled.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::backend::RandomSource;
use crate::chain::TransitionChain;
use crate::changes::{FadeTarget, LayerSpec, StackChanges, TimerCommand};
use crate::config::StackerConfig;
use crate::error::StackError;
use crate::event::StackEvent;
use crate::key::ImageKey;
use crate::stack::{Generation, LayerId, LayerStack};

/// An operation that can be deferred behind an in-flight transition via
/// [`Stacker::enqueue`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackOp {
    /// Replace the gallery and show a random entry.
    LoadGallery {
        /// Raw image paths; the configured prefix is applied at run time.
        paths: Vec<String>,
        /// Static markup for each created layer.
        html: Option<String>,
    },
    /// Append one image to the gallery.
    LoadImage {
        /// Raw image path; the configured prefix is applied at run time.
        path: String,
        /// Static markup for the created layer.
        html: Option<String>,
    },
    /// Bring the named image to the front.
    ShowImage(
        /// The normalized key to show.
        ImageKey,
    ),
    /// Advance to the next gallery entry.
    ShowNext,
    /// Fade everything out, restoring the container's own background.
    ShowDefault,
}

/// The completion contract of the in-flight transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Watched {
    /// A show request: the target layer's fade-in at the issued generation.
    FadeIn {
        layer: LayerId,
        generation: Generation,
    },
    /// A default restore: all layers fade out; counts down per completion.
    AllOut { remaining: usize },
}

/// Crossfade image rotator: layer stack, gallery, rotation scheduler, and
/// transition chain behind one facade.
pub struct Stacker {
    config: StackerConfig,
    stack: LayerStack,
    gallery: Vec<ImageKey>,
    current: Option<ImageKey>,
    rotating: bool,
    default_image: ImageKey,
    chain: TransitionChain<StackOp>,
    watched: Option<Watched>,
    random: Box<dyn RandomSource>,
}

impl fmt::Debug for Stacker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stacker")
            .field("current", &self.current)
            .field("rotating", &self.rotating)
            .field("gallery", &self.gallery)
            .field("layers", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl Stacker {
    /// Creates a rotator over an empty stack.
    ///
    /// `default_background` is the container's own background-image style
    /// value (normalized here; a `url(...)` wrapper is accepted). It is the
    /// path reported when [`show_default`](Self::show_default) completes.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Configuration`] for inconsistent options.
    pub fn new(
        config: StackerConfig,
        default_background: &str,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, StackError> {
        config.validate()?;
        Ok(Self {
            default_image: ImageKey::normalize(default_background),
            config,
            stack: LayerStack::new(),
            gallery: Vec::new(),
            current: None,
            rotating: false,
            chain: TransitionChain::new(),
            watched: None,
            random,
        })
    }

    // -- Queries --

    /// The configuration this rotator was built with.
    #[must_use]
    pub fn config(&self) -> &StackerConfig {
        &self.config
    }

    /// The layer stack; backends read keys and positions from it.
    #[must_use]
    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    /// The gallery sequence in rotation order.
    #[must_use]
    pub fn gallery(&self) -> &[ImageKey] {
        &self.gallery
    }

    /// The key currently shown (or being faded in), if any.
    #[must_use]
    pub fn current(&self) -> Option<&ImageKey> {
        self.current.as_ref()
    }

    /// The container's own background image, shown when the stack fades out.
    #[must_use]
    pub fn default_image(&self) -> &ImageKey {
        &self.default_image
    }

    /// Whether the rotation timer is armed.
    #[must_use]
    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Whether a transition's completion is still pending.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.watched.is_some()
    }

    /// The number of operations queued behind the in-flight transition.
    #[must_use]
    pub fn pending_ops(&self) -> usize {
        self.chain.pending()
    }

    // -- Public operations --

    /// Replaces the gallery with `paths`, ensures a layer per distinct
    /// normalized key, shows one entry chosen uniformly at random, and
    /// arms rotation per the rotate-on-load policy.
    ///
    /// Any operations still queued behind an in-flight transition are
    /// discarded (an explicit reset, not a drain).
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DegenerateGallery`] for an empty path list,
    /// leaving all state unchanged.
    pub fn load_gallery(
        &mut self,
        paths: &[&str],
        html: Option<&str>,
    ) -> Result<StackChanges, StackError> {
        let keys = paths.iter().map(|path| self.prefixed(path)).collect();
        self.load_gallery_keys(keys, html.map(String::from))
    }

    /// Appends one image to the gallery (coalescing a duplicate of an
    /// existing key), ensures its layer, and arms rotation per the
    /// rotate-on-load policy. Does not change the current image.
    pub fn load_image(&mut self, path: &str, html: Option<&str>) -> StackChanges {
        let key = self.prefixed(path);
        self.load_image_key(key, html.map(String::from))
    }

    /// Brings the layer for `key` to the front by fading every other layer
    /// out and the target in.
    ///
    /// Calling this with the key already current is a no-op. A show issued
    /// while another transition is in flight supersedes it: the superseded
    /// completion contract and its queued continuations are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::InvalidKey`] when no layer exists for `key`,
    /// leaving all state unchanged.
    pub fn show_image(&mut self, key: &ImageKey) -> Result<StackChanges, StackError> {
        if self.current.as_ref() == Some(key) {
            return Ok(StackChanges::new());
        }
        let target = self
            .stack
            .layer_for(key)
            .ok_or_else(|| StackError::InvalidKey(key.clone()))?;

        if self.watched.is_some() {
            self.chain.cancel();
            self.watched = None;
        }

        let mut changes = StackChanges::new();
        let ids: Vec<LayerId> = self.stack.ids().collect();
        for layer in ids {
            if layer != target {
                let fade = self.fade(layer, 0.0);
                changes.fades.push(fade);
            }
        }
        let lead = self.fade(target, 1.0);
        self.watched = Some(Watched::FadeIn {
            layer: target,
            generation: lead.generation,
        });
        changes.fades.push(lead);

        self.chain.begin();
        self.current = Some(key.clone());
        Ok(changes)
    }

    /// Advances to the gallery entry after the current one, wrapping
    /// around. When nothing has been shown yet, starts at the first entry.
    ///
    /// When rotation is in use, fires
    /// [`RotationWaitStart`](StackEvent::RotationWaitStart) before the fade
    /// so countdown indicators can restart.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DegenerateGallery`] on an empty gallery and
    /// [`StackError::InvalidKey`] when the current key is absent from the
    /// gallery; state is unchanged in both cases.
    pub fn show_next(&mut self) -> Result<StackChanges, StackError> {
        if self.gallery.is_empty() {
            return Err(StackError::DegenerateGallery { len: 0 });
        }
        let next = match &self.current {
            None => 0,
            Some(current) => {
                let at = self
                    .gallery
                    .iter()
                    .position(|key| key == current)
                    .ok_or_else(|| StackError::InvalidKey(current.clone()))?;
                (at + 1) % self.gallery.len()
            }
        };

        let mut changes = StackChanges::new();
        if self.use_rotation() {
            changes.events.push(StackEvent::RotationWaitStart {
                interval: self.config.rotation_interval,
                duration: self.config.transition_duration,
            });
        }
        let key = self.gallery[next].clone();
        changes.merge(self.show_image(&key)?);
        Ok(changes)
    }

    /// Fades every layer out, restoring the container's own background.
    ///
    /// Completion is a count-down barrier: the
    /// [`ImageShown`](StackEvent::ImageShown) notification (carrying the
    /// default image's path) fires and queued operations drain only once
    /// ALL layers have finished fading out. An empty stack completes
    /// immediately. If rotation is active, the timer is cancelled and
    /// [`RotationWaitCancel`](StackEvent::RotationWaitCancel) fires.
    pub fn show_default(&mut self) -> StackChanges {
        let mut changes = StackChanges::new();
        if self.watched.is_some() {
            self.chain.cancel();
            self.watched = None;
        }
        self.current = None;

        let ids: Vec<LayerId> = self.stack.ids().collect();
        if ids.is_empty() {
            changes
                .events
                .push(StackEvent::ImageShown(self.default_image.clone()));
        } else {
            let remaining = ids.len();
            for layer in ids {
                let fade = self.fade(layer, 0.0);
                changes.fades.push(fade);
            }
            self.watched = Some(Watched::AllOut { remaining });
            self.chain.begin();
        }

        if self.rotating {
            changes.merge(self.stop_rotation());
        }
        changes
    }

    /// Arms the rotation timer with period `interval + duration`, so a
    /// tick never lands while the previous fade is still running.
    /// Re-arming while already rotating is allowed; the backend cancels
    /// the old timer first. Fires
    /// [`RotationWaitStart`](StackEvent::RotationWaitStart) once
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DegenerateGallery`] for galleries shorter
    /// than two entries; a cycle over them is a fixed point.
    pub fn start_rotation(&mut self) -> Result<StackChanges, StackError> {
        if self.gallery.len() < 2 {
            return Err(StackError::DegenerateGallery {
                len: self.gallery.len(),
            });
        }
        Ok(self.arm_rotation())
    }

    /// Cancels the rotation timer and fires
    /// [`RotationWaitCancel`](StackEvent::RotationWaitCancel). A no-op when
    /// not rotating.
    pub fn stop_rotation(&mut self) -> StackChanges {
        let mut changes = StackChanges::new();
        if self.rotating {
            self.rotating = false;
            changes.timer = Some(TimerCommand::Cancel);
            changes.events.push(StackEvent::RotationWaitCancel);
        }
        changes
    }

    /// Submits an operation through the transition chain: it runs
    /// immediately when no transition is in flight, and otherwise waits for
    /// the in-flight transition's completion.
    ///
    /// A deferred operation that fails when it finally runs reports its
    /// error in [`StackChanges::errors`].
    pub fn enqueue(&mut self, op: StackOp) -> StackChanges {
        match self.chain.submit(op) {
            Some(op) => self.run(op),
            None => StackChanges::new(),
        }
    }

    // -- Backend feedback --

    /// Reports that a fade issued at `generation` has settled on `layer`.
    ///
    /// Completions whose generation has been superseded by a retarget are
    /// ignored. The watched fade-in's completion fires
    /// [`ImageShown`](StackEvent::ImageShown) and drains queued operations;
    /// barrier completions count down and drain once all layers are out.
    pub fn fade_finished(&mut self, layer: LayerId, generation: Generation) -> StackChanges {
        let mut changes = StackChanges::new();
        if !self.stack.is_current(layer, generation) {
            return changes;
        }
        match self.watched.take() {
            Some(Watched::FadeIn {
                layer: watched,
                generation: lead,
            }) if watched == layer && lead == generation => {
                changes
                    .events
                    .push(StackEvent::ImageShown(self.stack.key_at(layer).clone()));
                changes.merge(self.complete_transition());
            }
            Some(Watched::AllOut { remaining }) if remaining <= 1 => {
                changes
                    .events
                    .push(StackEvent::ImageShown(self.default_image.clone()));
                changes.merge(self.complete_transition());
            }
            Some(Watched::AllOut { remaining }) => {
                self.watched = Some(Watched::AllOut {
                    remaining: remaining - 1,
                });
            }
            other => self.watched = other,
        }
        changes
    }

    /// Reports a rotation timer fire.
    ///
    /// Advances to the next gallery entry. A straggler tick delivered
    /// after cancellation is ignored; a tick that cannot advance (the
    /// gallery changed underneath) reports in
    /// [`StackChanges::errors`].
    pub fn rotation_tick(&mut self) -> StackChanges {
        if !self.rotating {
            return StackChanges::new();
        }
        match self.show_next() {
            Ok(changes) => changes,
            Err(err) => {
                let mut changes = StackChanges::new();
                changes.errors.push(err);
                changes
            }
        }
    }

    // -- Internal --

    fn prefixed(&self, path: &str) -> ImageKey {
        ImageKey::prefixed(&self.config.image_path_prefix, path)
    }

    fn load_gallery_keys(
        &mut self,
        keys: Vec<ImageKey>,
        html: Option<String>,
    ) -> Result<StackChanges, StackError> {
        let mut gallery: Vec<ImageKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !gallery.contains(&key) {
                gallery.push(key);
            }
        }
        if gallery.is_empty() {
            return Err(StackError::DegenerateGallery { len: 0 });
        }

        // An explicit reset: operations queued behind an in-flight
        // transition are discarded, not run.
        self.chain.cancel();
        self.watched = None;

        let mut changes = StackChanges::new();
        for key in &gallery {
            self.ensure_layer(key, html.as_deref(), &mut changes);
        }
        let pick = self.random.next_index(gallery.len());
        let chosen = gallery[pick].clone();
        self.gallery = gallery;

        changes.merge(self.show_image(&chosen)?);

        if self.rotating && self.gallery.len() < 2 {
            // A replacement gallery too short to cycle ends rotation.
            changes.merge(self.stop_rotation());
        } else {
            changes.merge(self.auto_arm());
        }
        Ok(changes)
    }

    fn load_image_key(&mut self, key: ImageKey, html: Option<String>) -> StackChanges {
        let mut changes = StackChanges::new();
        if !self.gallery.contains(&key) {
            self.gallery.push(key.clone());
        }
        self.ensure_layer(&key, html.as_deref(), &mut changes);
        changes.merge(self.auto_arm());
        changes
    }

    fn ensure_layer(
        &mut self,
        key: &ImageKey,
        html: Option<&str>,
        changes: &mut StackChanges,
    ) -> LayerId {
        let (layer, created) = self.stack.ensure(key);
        if created {
            changes.created.push(LayerSpec {
                layer,
                key: key.clone(),
                position: layer.index(),
                html: html.map(String::from),
            });
        }
        layer
    }

    /// Issues a fade, superseding any in-flight fade on the same layer.
    fn fade(&mut self, layer: LayerId, opacity: f32) -> FadeTarget {
        let generation = self.stack.retarget(layer);
        self.stack.set_target(layer, opacity);
        FadeTarget {
            layer,
            opacity,
            duration: self.config.transition_duration,
            curve: self.config.curve,
            generation,
        }
    }

    fn use_rotation(&self) -> bool {
        self.config.rotate_on_load && self.gallery.len() > 1
    }

    fn auto_arm(&mut self) -> StackChanges {
        if !self.rotating && self.use_rotation() {
            self.arm_rotation()
        } else {
            StackChanges::new()
        }
    }

    fn arm_rotation(&mut self) -> StackChanges {
        self.rotating = true;
        let mut changes = StackChanges::new();
        changes.timer = Some(TimerCommand::Arm(self.config.rotation_period()));
        changes.events.push(StackEvent::RotationWaitStart {
            interval: self.config.rotation_interval,
            duration: self.config.transition_duration,
        });
        changes
    }

    /// Completes the watched transition and drains queued operations in
    /// FIFO order. A drained operation that begins a new transition stops
    /// the drain; the remainder waits behind it.
    fn complete_transition(&mut self) -> StackChanges {
        self.chain.complete();
        let mut changes = StackChanges::new();
        while let Some(op) = self.chain.pop_ready() {
            changes.merge(self.run(op));
        }
        changes
    }

    fn run(&mut self, op: StackOp) -> StackChanges {
        let result = match op {
            StackOp::LoadGallery { paths, html } => {
                let keys = paths.iter().map(|path| self.prefixed(path)).collect();
                self.load_gallery_keys(keys, html)
            }
            StackOp::LoadImage { path, html } => {
                let key = self.prefixed(&path);
                Ok(self.load_image_key(key, html))
            }
            StackOp::ShowImage(key) => self.show_image(&key),
            StackOp::ShowNext => self.show_next(),
            StackOp::ShowDefault => Ok(self.show_default()),
        };
        result.unwrap_or_else(|err| {
            let mut changes = StackChanges::new();
            changes.errors.push(err);
            changes
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::time::Duration;

    use super::*;

    /// Always picks `n % len`.
    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn next_index(&mut self, len: usize) -> usize {
            self.0 % len
        }
    }

    fn stacker_with(config: StackerConfig, pick: usize) -> Stacker {
        Stacker::new(config, "url(default.png)", Box::new(Fixed(pick))).expect("valid config")
    }

    fn no_rotate() -> StackerConfig {
        StackerConfig {
            rotate_on_load: false,
            ..StackerConfig::default()
        }
    }

    fn key(path: &str) -> ImageKey {
        ImageKey::new(path)
    }

    /// Completes the lead (fade-in) of the given changes batch.
    fn finish_lead(stacker: &mut Stacker, changes: &StackChanges) -> StackChanges {
        let lead = changes
            .fades
            .iter()
            .find(|fade| fade.opacity == 1.0)
            .copied()
            .expect("a fade-in was issued");
        stacker.fade_finished(lead.layer, lead.generation)
    }

    #[test]
    fn construction_normalizes_default_background() {
        let stacker = stacker_with(no_rotate(), 0);
        assert_eq!(stacker.default_image(), &key("default.png"));
        assert_eq!(stacker.current(), None);
        assert!(!stacker.is_rotating());
    }

    #[test]
    fn construction_rejects_bad_config() {
        let config = StackerConfig {
            rotation_interval: Duration::ZERO,
            ..StackerConfig::default()
        };
        let err = Stacker::new(config, "default.png", Box::new(Fixed(0)));
        assert!(matches!(err, Err(StackError::Configuration(_))));
    }

    #[test]
    fn load_gallery_creates_one_layer_per_distinct_key() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let changes = stacker
            .load_gallery(&["a.png", "b.png", "a.png"], None)
            .expect("non-empty gallery");
        assert_eq!(changes.created.len(), 2, "duplicate key coalesces");
        assert_eq!(stacker.stack().len(), 2);
        assert_eq!(stacker.gallery().len(), 2);
    }

    #[test]
    fn load_gallery_applies_prefix() {
        let config = StackerConfig {
            image_path_prefix: String::from("/img/"),
            ..no_rotate()
        };
        let mut stacker = stacker_with(config, 0);
        stacker.load_gallery(&["a.png"], None).expect("loads");
        assert_eq!(stacker.gallery(), &[key("/img/a.png")]);
    }

    #[test]
    fn load_gallery_empty_errors_and_leaves_state() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let err = stacker.load_gallery(&[], None);
        assert_eq!(err, Err(StackError::DegenerateGallery { len: 0 }));
        assert_eq!(stacker.stack().len(), 0);
        assert_eq!(stacker.current(), None);
    }

    #[test]
    fn load_gallery_shows_the_drawn_entry() {
        let mut stacker = stacker_with(no_rotate(), 1);
        let changes = stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        assert_eq!(stacker.current(), Some(&key("b.png")));
        assert!(stacker.is_transitioning());
        assert!(changes.timer.is_none(), "rotation disabled");

        // One fade-out plus the watched fade-in, which is issued last.
        assert_eq!(changes.fades.len(), 2);
        assert_eq!(changes.fades[1].opacity, 1.0);
        let target = changes.fades[1].layer;
        assert_eq!(stacker.stack().key_at(target), &key("b.png"));
    }

    #[test]
    fn repeated_show_is_a_noop() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let changes = stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        finish_lead(&mut stacker, &changes);

        let again = stacker.show_image(&key("a.png")).expect("known key");
        assert!(again.is_empty(), "second show of the current key is a no-op");
    }

    #[test]
    fn show_image_unknown_key_leaves_state_unchanged() {
        let mut stacker = stacker_with(no_rotate(), 0);
        stacker.load_gallery(&["a.png"], None).expect("loads");
        let err = stacker.show_image(&key("missing.png"));
        assert_eq!(err, Err(StackError::InvalidKey(key("missing.png"))));
        assert_eq!(stacker.current(), Some(&key("a.png")));
    }

    #[test]
    fn show_next_cycles_back_to_the_start() {
        let mut stacker = stacker_with(no_rotate(), 0);
        stacker
            .load_gallery(&["a.png", "b.png", "c.png"], None)
            .expect("loads");
        assert_eq!(stacker.current(), Some(&key("a.png")));

        let mut seen = Vec::new();
        for _ in 0..3 {
            stacker.show_next().expect("cycles");
            seen.push(stacker.current().cloned().expect("current is set"));
        }
        assert_eq!(seen, [key("b.png"), key("c.png"), key("a.png")]);
    }

    #[test]
    fn show_next_on_empty_gallery_errors() {
        let mut stacker = stacker_with(no_rotate(), 0);
        assert_eq!(
            stacker.show_next(),
            Err(StackError::DegenerateGallery { len: 0 })
        );
    }

    #[test]
    fn show_next_with_current_outside_gallery_errors() {
        let mut stacker = stacker_with(no_rotate(), 0);
        stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        // Replace the gallery; the old layers survive.
        stacker.load_gallery(&["c.png", "d.png"], None).expect("loads");
        // Showing a surviving layer puts a non-gallery key in front.
        stacker.show_image(&key("a.png")).expect("layer survives");

        assert_eq!(
            stacker.show_next(),
            Err(StackError::InvalidKey(key("a.png")))
        );
        assert_eq!(stacker.current(), Some(&key("a.png")), "state unchanged");
    }

    #[test]
    fn show_next_before_anything_was_shown_starts_at_the_front() {
        let mut stacker = stacker_with(no_rotate(), 0);
        stacker.load_image("a.png", None);
        stacker.load_image("b.png", None);
        assert_eq!(stacker.current(), None);

        stacker.show_next().expect("starts at index 0");
        assert_eq!(stacker.current(), Some(&key("a.png")));
    }

    #[test]
    fn rotation_never_arms_on_short_galleries() {
        let mut stacker = stacker_with(StackerConfig::default(), 0);
        let changes = stacker.load_gallery(&["a.png"], None).expect("loads");
        assert!(changes.timer.is_none());
        assert!(!stacker.is_rotating(), "one entry cannot rotate");
    }

    #[test]
    fn load_image_arms_a_dormant_rotation() {
        let mut stacker = stacker_with(StackerConfig::default(), 0);
        stacker.load_gallery(&["a.png"], None).expect("loads");
        assert!(!stacker.is_rotating());

        let changes = stacker.load_image("d.png", None);
        assert_eq!(stacker.gallery().len(), 2);
        assert!(stacker.is_rotating());
        assert_eq!(
            changes.timer,
            Some(TimerCommand::Arm(Duration::from_millis(7000))),
            "period is interval + duration"
        );
        assert!(
            changes
                .events
                .contains(&StackEvent::RotationWaitStart {
                    interval: Duration::from_millis(5000),
                    duration: Duration::from_millis(2000),
                }),
            "arming announces the first wait"
        );
        assert_eq!(stacker.current(), None, "loadImage never changes the front");
    }

    #[test]
    fn rotate_on_load_false_never_arms() {
        let mut stacker = stacker_with(no_rotate(), 0);
        stacker
            .load_gallery(&["a.png", "b.png", "c.png"], None)
            .expect("loads");
        stacker.load_image("d.png", None);
        assert!(!stacker.is_rotating());
    }

    #[test]
    fn start_rotation_refuses_short_galleries() {
        let mut stacker = stacker_with(StackerConfig::default(), 0);
        assert_eq!(
            stacker.start_rotation(),
            Err(StackError::DegenerateGallery { len: 0 })
        );
        stacker.load_gallery(&["a.png"], None).expect("loads");
        assert_eq!(
            stacker.start_rotation(),
            Err(StackError::DegenerateGallery { len: 1 })
        );
    }

    #[test]
    fn start_rotation_rearms_idempotently() {
        let mut stacker = stacker_with(no_rotate(), 0);
        stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");

        let first = stacker.start_rotation().expect("long enough");
        let second = stacker.start_rotation().expect("re-arm is allowed");
        assert!(matches!(first.timer, Some(TimerCommand::Arm(_))));
        assert!(matches!(second.timer, Some(TimerCommand::Arm(_))));
        assert!(stacker.is_rotating());
    }

    #[test]
    fn stop_rotation_cancels_and_notifies_once() {
        let mut stacker = stacker_with(StackerConfig::default(), 0);
        stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        assert!(stacker.is_rotating());

        let changes = stacker.stop_rotation();
        assert_eq!(changes.timer, Some(TimerCommand::Cancel));
        assert!(changes.events.contains(&StackEvent::RotationWaitCancel));
        assert!(!stacker.is_rotating());

        assert!(stacker.stop_rotation().is_empty(), "second stop is a no-op");
    }

    #[test]
    fn replacement_gallery_too_short_ends_rotation() {
        let mut stacker = stacker_with(StackerConfig::default(), 0);
        stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        assert!(stacker.is_rotating());

        let changes = stacker.load_gallery(&["c.png"], None).expect("loads");
        assert!(!stacker.is_rotating());
        assert_eq!(changes.timer, Some(TimerCommand::Cancel));
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let first = stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        let stale_lead = first.fades[1];

        // Supersede before the first transition completes.
        stacker.show_image(&key("b.png")).expect("known key");

        let changes = stacker.fade_finished(stale_lead.layer, stale_lead.generation);
        assert!(changes.is_empty(), "superseded completion must not fire");
    }

    #[test]
    fn completion_fires_image_shown_and_drains() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let changes = stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");

        let queued = stacker.enqueue(StackOp::LoadImage {
            path: String::from("d.png"),
            html: None,
        });
        assert!(queued.is_empty(), "deferred behind the in-flight fade");
        assert_eq!(stacker.pending_ops(), 1);

        let done = finish_lead(&mut stacker, &changes);
        assert!(done.events.contains(&StackEvent::ImageShown(key("a.png"))));
        assert!(
            stacker.gallery().contains(&key("d.png")),
            "queued load ran on completion"
        );
        assert_eq!(stacker.pending_ops(), 0);
    }

    #[test]
    fn supersede_discards_queued_work() {
        let mut stacker = stacker_with(no_rotate(), 0);
        stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        stacker.enqueue(StackOp::LoadImage {
            path: String::from("d.png"),
            html: None,
        });

        // A direct show mid-flight supersedes the first transition.
        let second = stacker.show_image(&key("b.png")).expect("known key");
        assert_eq!(stacker.pending_ops(), 0, "cancelled continuations are dropped");

        let done = finish_lead(&mut stacker, &second);
        assert!(done.events.contains(&StackEvent::ImageShown(key("b.png"))));
        assert!(
            !stacker.gallery().contains(&key("d.png")),
            "the discarded operation never runs"
        );
    }

    #[test]
    fn drain_stops_behind_a_new_transition() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let first = stacker
            .load_gallery(&["a.png", "b.png", "c.png"], None)
            .expect("loads");
        stacker.enqueue(StackOp::ShowImage(key("b.png")));
        stacker.enqueue(StackOp::LoadImage {
            path: String::from("e.png"),
            html: None,
        });

        let drained = finish_lead(&mut stacker, &first);
        assert_eq!(stacker.current(), Some(&key("b.png")));
        assert!(
            !stacker.gallery().contains(&key("e.png")),
            "the load waits behind the drained show"
        );
        assert_eq!(stacker.pending_ops(), 1);

        let done = finish_lead(&mut stacker, &drained);
        assert!(done.events.contains(&StackEvent::ImageShown(key("b.png"))));
        assert!(stacker.gallery().contains(&key("e.png")));
    }

    #[test]
    fn deferred_failure_is_reported_not_swallowed() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let changes = stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        stacker.enqueue(StackOp::ShowImage(key("missing.png")));

        let done = finish_lead(&mut stacker, &changes);
        assert_eq!(done.errors, [StackError::InvalidKey(key("missing.png"))]);
    }

    #[test]
    fn show_default_waits_for_every_layer() {
        let mut stacker = stacker_with(StackerConfig::default(), 0);
        let loaded = stacker
            .load_gallery(&["a.png", "b.png", "c.png"], None)
            .expect("loads");
        finish_lead(&mut stacker, &loaded);
        assert!(stacker.is_rotating());

        let out = stacker.show_default();
        assert_eq!(out.fades.len(), 3);
        assert!(out.fades.iter().all(|fade| fade.opacity == 0.0));
        assert_eq!(out.timer, Some(TimerCommand::Cancel));
        assert!(out.events.contains(&StackEvent::RotationWaitCancel));
        assert_eq!(stacker.current(), None);
        assert!(!stacker.is_rotating());

        // The first two completions only count down.
        for fade in &out.fades[..2] {
            let partial = stacker.fade_finished(fade.layer, fade.generation);
            assert!(partial.events.is_empty(), "barrier has not released yet");
        }
        let last = &out.fades[2];
        let done = stacker.fade_finished(last.layer, last.generation);
        assert!(done
            .events
            .contains(&StackEvent::ImageShown(key("default.png"))));
    }

    #[test]
    fn show_default_on_empty_stack_completes_immediately() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let changes = stacker.show_default();
        assert!(changes.fades.is_empty());
        assert_eq!(
            changes.events,
            [StackEvent::ImageShown(key("default.png"))]
        );
        assert!(!stacker.is_transitioning());
    }

    #[test]
    fn rotation_ticks_advance_and_wrap() {
        let config = StackerConfig {
            rotation_interval: Duration::from_millis(1000),
            transition_duration: Duration::from_millis(500),
            ..StackerConfig::default()
        };
        let mut stacker = stacker_with(config, 0);
        let loaded = stacker
            .load_gallery(&["a.png", "b.png", "c.png"], None)
            .expect("loads");
        assert_eq!(
            loaded.timer,
            Some(TimerCommand::Arm(Duration::from_millis(1500)))
        );

        let tick = stacker.rotation_tick();
        assert_eq!(stacker.current(), Some(&key("b.png")));
        assert_eq!(
            tick.events.first(),
            Some(&StackEvent::RotationWaitStart {
                interval: Duration::from_millis(1000),
                duration: Duration::from_millis(500),
            }),
            "the wait notification precedes the fade"
        );

        stacker.rotation_tick();
        assert_eq!(stacker.current(), Some(&key("c.png")));
        stacker.rotation_tick();
        assert_eq!(stacker.current(), Some(&key("a.png")), "wraps around");
    }

    #[test]
    fn straggler_tick_after_cancel_is_ignored() {
        let mut stacker = stacker_with(StackerConfig::default(), 0);
        stacker.load_gallery(&["a.png", "b.png"], None).expect("loads");
        stacker.stop_rotation();

        let tick = stacker.rotation_tick();
        assert!(tick.is_empty());
        assert_eq!(stacker.current(), Some(&key("a.png")));
    }

    #[test]
    fn enqueue_runs_immediately_when_idle() {
        let mut stacker = stacker_with(no_rotate(), 0);
        let changes = stacker.enqueue(StackOp::LoadImage {
            path: String::from("a.png"),
            html: None,
        });
        assert_eq!(changes.created.len(), 1);
        assert_eq!(stacker.gallery(), &[key("a.png")]);
    }
}
