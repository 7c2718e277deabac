// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM layer management.
//!
//! Translates [`StackChanges`] into a stack of cloned, absolutely
//! positioned elements inserted after the template container, with opacity
//! fades run as CSS transitions.
//!
//! A fade's completion is observed via `transitionend` and reported to the
//! completion handler together with the *newest* generation issued for the
//! layer: retargeting a mid-flight fade simply points the CSS transition at
//! the new value, so at most one `transitionend` fires per layer and it
//! belongs to the newest fade. A fade whose target equals the value already
//! in place runs no CSS transition at all and is completed inline.
//!
//! [`StackChanges`]: strata_core::changes::StackChanges

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlElement;

use strata_core::backend::Stage;
use strata_core::changes::{FadeTarget, LayerSpec, StackChanges, TimerCommand};
use strata_core::config::FadeCurve;
use strata_core::error::StackError;
use strata_core::event::{self, EventSink, NoopSink};
use strata_core::stack::{Generation, LayerId, LayerStack};
use strata_core::time::Duration;

use crate::timer::IntervalHandle;

type FadeClosure = Closure<dyn FnMut(web_sys::Event)>;

/// Maps the layer stack to live DOM elements and applies effect batches.
///
/// The stage owns the template container `HtmlElement`; layer elements are
/// shallow clones of it inserted as following siblings, stacked by z-index
/// strictly above the template. Fade completions are delivered through the
/// completion handler and rotation timer fires through the tick handler;
/// the application feeds both back into the
/// [`Stacker`](strata_core::engine::Stacker) and applies the returned
/// batch here again.
pub struct DomStage {
    container: HtmlElement,
    base_z: i32,
    elements: Vec<Option<HtmlElement>>,
    issued: Vec<Rc<Cell<Option<Generation>>>>,
    listeners: Vec<Option<FadeClosure>>,
    on_fade_complete: Rc<dyn Fn(LayerId, Generation)>,
    on_tick: Rc<dyn Fn()>,
    timer: Option<IntervalHandle>,
    sink: Box<dyn EventSink>,
}

impl core::fmt::Debug for DomStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomStage")
            .field("container", &"HtmlElement")
            .field("base_z", &self.base_z)
            .field("elements_len", &self.elements.len())
            .field("timer_armed", &self.timer.is_some())
            .finish_non_exhaustive()
    }
}

impl DomStage {
    /// Creates a stage over the given container element.
    ///
    /// `on_fade_complete` and `on_tick` are invoked from browser callbacks;
    /// they should route into the owning `Stacker` and apply the returned
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Configuration`] when the container is detached
    /// (layer clones could not be inserted as siblings).
    pub fn new(
        container: HtmlElement,
        on_fade_complete: impl Fn(LayerId, Generation) + 'static,
        on_tick: impl Fn() + 'static,
    ) -> Result<Self, StackError> {
        if container.parent_node().is_none() {
            return Err(StackError::Configuration("stack holder element is detached"));
        }
        let base_z = container
            .style()
            .get_property_value("z-index")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        Ok(Self {
            container,
            base_z,
            elements: Vec::new(),
            issued: Vec::new(),
            listeners: Vec::new(),
            on_fade_complete: Rc::new(on_fade_complete),
            on_tick: Rc::new(on_tick),
            timer: None,
            sink: Box::new(NoopSink),
        })
    }

    /// Replaces the event sink notifications are forwarded to.
    pub fn set_sink(&mut self, sink: impl EventSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Returns the container's own background-image style value, suitable
    /// for [`Stacker::new`](strata_core::engine::Stacker::new)'s default
    /// background.
    #[must_use]
    pub fn background_image(&self) -> String {
        self.container
            .style()
            .get_property_value("background-image")
            .unwrap_or_default()
    }

    /// Returns the DOM element for the given layer, if materialized.
    #[must_use]
    pub fn element(&self, layer: LayerId) -> Option<&HtmlElement> {
        self.elements
            .get(layer.index() as usize)
            .and_then(|slot| slot.as_ref())
    }

    fn grow_to(&mut self, slot: usize) {
        if self.elements.len() <= slot {
            self.elements.resize_with(slot + 1, || None);
            self.listeners.resize_with(slot + 1, || None);
            self.issued
                .resize_with(slot + 1, || Rc::new(Cell::new(None)));
        }
    }

    fn create_layer(&mut self, spec: &LayerSpec) {
        let slot = spec.layer.index() as usize;
        self.grow_to(slot);

        let el: HtmlElement = self
            .container
            .clone_node()
            .expect("clone_node failed")
            .unchecked_into();
        let style = el.style();
        let _ = style.set_property("opacity", "0");
        #[expect(
            clippy::cast_possible_wrap,
            reason = "stacking positions are small; a wrap would need 2^31 layers"
        )]
        let z = self.base_z + spec.position as i32 + 1;
        let _ = style.set_property("z-index", &z.to_string());
        let _ = style.set_property("background-image", &format!("url({})", spec.key.as_str()));
        if let Some(html) = &spec.html {
            el.set_inner_html(html);
        }
        let _ = self.container.after_with_node_1(&el);

        // The completion callback reports the newest issued generation;
        // transitions from descendants are filtered out by target identity.
        let issued = Rc::clone(&self.issued[slot]);
        let handler = Rc::clone(&self.on_fade_complete);
        let layer = spec.layer;
        let own_target: JsValue = el.clone().into();
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let from_layer = event
                .target()
                .is_some_and(|target| JsValue::from(target) == own_target);
            if from_layer && let Some(generation) = issued.get() {
                handler(layer, generation);
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        let _ = el.add_event_listener_with_callback("transitionend", closure.as_ref().unchecked_ref());

        self.listeners[slot] = Some(closure);
        self.elements[slot] = Some(el);
    }

    fn start_fade(&mut self, fade: &FadeTarget) {
        let slot = fade.layer.index() as usize;
        let Some(el) = self.elements.get(slot).and_then(|slot| slot.as_ref()) else {
            return;
        };
        let style = el.style();
        let target = format!("{}", fade.opacity);
        self.issued[slot].set(Some(fade.generation));

        // A no-op target runs no CSS transition and fires no
        // transitionend; complete it inline.
        let current = style.get_property_value("opacity").unwrap_or_default();
        if current == target || fade.duration.is_zero() {
            let _ = style.set_property("opacity", &target);
            (self.on_fade_complete)(fade.layer, fade.generation);
            return;
        }

        let _ = style.set_property(
            "transition",
            &format!(
                "opacity {}ms {}",
                fade.duration.as_millis(),
                css_timing(fade.curve)
            ),
        );
        // Flush pending style so a target set in the same tick still
        // transitions from the current value.
        let _ = el.offset_width();
        let _ = style.set_property("opacity", &target);
    }

    fn arm(&mut self, period: Duration) {
        let on_tick = Rc::clone(&self.on_tick);
        // Replacing the handle clears the previous interval.
        self.timer = Some(IntervalHandle::new(period, move || on_tick()));
    }
}

impl Stage for DomStage {
    fn apply(&mut self, _stack: &LayerStack, changes: &StackChanges) {
        for spec in &changes.created {
            self.create_layer(spec);
        }
        for fade in &changes.fades {
            self.start_fade(fade);
        }
        match changes.timer {
            Some(TimerCommand::Arm(period)) => self.arm(period),
            Some(TimerCommand::Cancel) => self.timer = None,
            None => {}
        }
        event::dispatch(self.sink.as_mut(), &changes.events);
    }
}

/// Maps a [`FadeCurve`] to a CSS timing function.
fn css_timing(curve: FadeCurve) -> &'static str {
    match curve {
        FadeCurve::Linear => "linear",
        FadeCurve::SineIn => "cubic-bezier(0.12, 0, 0.39, 0)",
        FadeCurve::SineOut => "cubic-bezier(0.61, 1, 0.88, 1)",
        FadeCurve::SineInOut => "cubic-bezier(0.37, 0, 0.63, 1)",
    }
}
