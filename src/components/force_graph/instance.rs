use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::mpsc::UnboundedSender;
use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent,
	WheelEvent, Window,
};

use super::render;
use super::state::{ForceGraphState, key_navigation};
use super::types::GraphData;
use crate::error::{ExplorerError, Result};
use crate::explorer::render::{Navigation, RenderInstance, RenderOptions, Renderer};
use crate::explorer::selection::ClickEvent;

const FRAME_DT: f32 = 0.016;

fn window() -> Result<Window> {
	web_sys::window().ok_or_else(|| ExplorerError::Render("no window".into()))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

struct Listener {
	target: EventTarget,
	kind: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

/// Builds canvas instances on the mounted `<canvas>` and forwards clicks.
pub struct CanvasRenderer {
	canvas: NodeRef<leptos::html::Canvas>,
	clicks: UnboundedSender<ClickEvent>,
}

impl CanvasRenderer {
	pub fn new(canvas: NodeRef<leptos::html::Canvas>, clicks: UnboundedSender<ClickEvent>) -> Self {
		Self { canvas, clicks }
	}
}

impl Renderer for CanvasRenderer {
	type Instance = CanvasInstance;

	fn create(&mut self, data: GraphData, options: &RenderOptions) -> Result<CanvasInstance> {
		let canvas: HtmlCanvasElement = self
			.canvas
			.get_untracked()
			.ok_or_else(|| ExplorerError::Render("graph container is not mounted".into()))?
			.into();
		CanvasInstance::start(canvas, &data, options, self.clicks.clone())
	}
}

/// One running engine: simulation state, its animation frame loop, and the
/// listeners bound to the canvas and window.
pub struct CanvasInstance {
	state: Rc<RefCell<ForceGraphState>>,
	frame: Rc<Cell<Option<i32>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	listeners: Vec<Listener>,
	released: bool,
}

impl CanvasInstance {
	fn start(
		canvas: HtmlCanvasElement,
		data: &GraphData,
		options: &RenderOptions,
		clicks: UnboundedSender<ClickEvent>,
	) -> Result<Self> {
		let window = window()?;
		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
			.ok_or_else(|| ExplorerError::Render("2d context unavailable".into()))?;

		let state = Rc::new(RefCell::new(ForceGraphState::new(data, options, w, h)));
		let mut instance = Self {
			state: state.clone(),
			frame: Rc::new(Cell::new(None)),
			animate: Rc::new(RefCell::new(None)),
			listeners: Vec::new(),
			released: false,
		};

		let (state_md, canvas_md) = (state.clone(), canvas.clone());
		instance.listen(&canvas, "mousedown", move |ev| {
			let (x, y) = local_point(&canvas_md, ev.unchecked_ref());
			state_md.borrow_mut().press(x, y);
		})?;

		let (state_mm, canvas_mm) = (state.clone(), canvas.clone());
		instance.listen(&canvas, "mousemove", move |ev| {
			let (x, y) = local_point(&canvas_mm, ev.unchecked_ref());
			state_mm.borrow_mut().pointer_move(x, y);
		})?;

		let (state_mu, canvas_mu) = (state.clone(), canvas.clone());
		instance.listen(&canvas, "mouseup", move |ev| {
			let (x, y) = local_point(&canvas_mu, ev.unchecked_ref());
			let click = state_mu.borrow_mut().release(x, y);
			if let Some(click) = click {
				let _ = clicks.unbounded_send(click);
			}
		})?;

		let state_ml = state.clone();
		instance.listen(&canvas, "mouseleave", move |_| {
			state_ml.borrow_mut().leave();
		})?;

		let (state_wh, canvas_wh) = (state.clone(), canvas.clone());
		instance.listen(&canvas, "wheel", move |ev| {
			ev.prevent_default();
			let wheel: &WheelEvent = ev.unchecked_ref();
			let (x, y) = local_point(&canvas_wh, wheel);
			let factor = if wheel.delta_y() > 0.0 { 0.9 } else { 1.1 };
			state_wh.borrow_mut().zoom_at(x, y, factor);
		})?;

		let (state_rs, canvas_rs) = (state.clone(), canvas.clone());
		instance.listen(&window, "resize", move |_| {
			let (nw, nh) = parent_size(&canvas_rs);
			canvas_rs.set_width(nw as u32);
			canvas_rs.set_height(nh as u32);
			state_rs.borrow_mut().resize(nw, nh);
		})?;

		if options.interaction.keyboard {
			let state_kb = state.clone();
			instance.listen(&window, "keydown", move |ev| {
				let key: &KeyboardEvent = ev.unchecked_ref();
				// Leave typing in the form alone
				let typing = key
					.target()
					.and_then(|t| t.dyn_into::<web_sys::Element>().ok())
					.is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"));
				if typing {
					return;
				}
				if let Some(command) = key_navigation(&key.key()) {
					ev.prevent_default();
					state_kb.borrow_mut().navigate(command);
				}
			})?;
		}

		let (state_anim, animate_inner, frame_inner) = (
			state.clone(),
			instance.animate.clone(),
			instance.frame.clone(),
		);
		*instance.animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				s.tick(FRAME_DT);
				render::render(&s, &ctx);
			}
			frame_inner.set(None);
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				}
			}
		}));
		if let Some(ref cb) = *instance.animate.borrow() {
			instance
				.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}

		debug!(
			"canvas instance started at {w}x{h} with {} listeners",
			instance.listeners.len()
		);
		Ok(instance)
	}

	fn listen(
		&mut self,
		target: &EventTarget,
		kind: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<()> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		target
			.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
			.map_err(|_| ExplorerError::Render(format!("cannot listen for {kind}")))?;
		self.listeners.push(Listener {
			target: target.clone(),
			kind,
			callback,
		});
		Ok(())
	}

	fn release(&mut self) {
		if self.released {
			return;
		}
		self.released = true;
		if let (Some(id), Some(win)) = (self.frame.take(), web_sys::window()) {
			let _ = win.cancel_animation_frame(id);
		}
		// Dropping the frame closure also breaks its self-reference
		self.animate.borrow_mut().take();
		for listener in self.listeners.drain(..) {
			let _ = listener.target.remove_event_listener_with_callback(
				listener.kind,
				listener.callback.as_ref().unchecked_ref(),
			);
		}
	}
}

impl RenderInstance for CanvasInstance {
	fn destroy(&mut self) {
		self.release();
		debug!("canvas instance destroyed");
	}

	fn navigate(&mut self, command: Navigation) {
		self.state.borrow_mut().navigate(command);
	}
}

impl Drop for CanvasInstance {
	fn drop(&mut self) {
		self.release();
	}
}
