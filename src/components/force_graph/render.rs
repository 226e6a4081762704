use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;
use crate::explorer::render::Smoothing;

const BACKGROUND: &str = "#fafafa";
/// Perpendicular offset of the curve's control point, relative to length.
const CURVE_BEND: f64 = 0.12;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// `#rrggbb` to `rgba(r, g, b, alpha)`.
fn with_alpha(hex: &str, alpha: f64) -> String {
	let channel = |i: usize| {
		hex.get(i..i + 2)
			.and_then(|c| u8::from_str_radix(c, 16).ok())
			.unwrap_or(128)
	};
	format!("rgba({}, {}, {}, {alpha})", channel(1), channel(3), channel(5))
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	if !state.edges_hidden() {
		draw_edges(state, ctx);
	}
	draw_nodes(state, ctx);
	ctx.restore();
	draw_tooltip(state, ctx);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k, 8.0 / k);
	let radius = state.node_radius();
	let t = ease_out_cubic(state.hover.highlight_t);
	let positions = state.positions();
	let edge_font = state.options.edges.font_size;

	for edge in state.edges() {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);
		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		// Quadratic control point bent to the left of the travel direction
		let (ux, uy) = (dx / dist, dy / dist);
		let bend = match state.options.edges.smooth {
			Smoothing::Continuous => dist * CURVE_BEND,
			Smoothing::None => 0.0,
		};
		let (cx, cy) = ((x1 + x2) / 2.0 - uy * bend, (y1 + y2) / 2.0 + ux * bend);

		// Tangents at both ends point at the control point
		let (sdx, sdy) = (cx - x1, cy - y1);
		let slen = sdx.hypot(sdy).max(0.001);
		let (edx, edy) = (x2 - cx, y2 - cy);
		let elen = edx.hypot(edy).max(0.001);
		let (eux, euy) = (edx / elen, edy / elen);
		let (start_x, start_y) = (x1 + sdx / slen * radius, y1 + sdy / slen * radius);
		let (tip_x, tip_y) = (x2 - eux * radius, y2 - euy * radius);
		let arrow = if edge.arrow_to {
			arrow_size
		} else {
			0.0
		};

		ctx.set_stroke_style_str(&with_alpha(&edge.color, edge_alpha));
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(start_x, start_y);
		ctx.quadratic_curve_to(cx, cy, tip_x - eux * arrow, tip_y - euy * arrow);
		ctx.stroke();

		if arrow > 0.0 {
			ctx.set_fill_style_str(&with_alpha(&edge.color, (edge_alpha + 0.2).min(1.0)));
			let (back_x, back_y) = (tip_x - eux * arrow, tip_y - euy * arrow);
			let (px, py) = (-euy * arrow * 0.5, eux * arrow * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		if let Some(label) = &edge.label {
			// Midpoint of the quadratic curve
			let (mx, my) = (
				0.25 * x1 + 0.5 * cx + 0.25 * x2,
				0.25 * y1 + 0.5 * cy + 0.25 * y2,
			);
			ctx.set_fill_style_str(&format!("rgba(90, 90, 90, {})", edge_alpha));
			ctx.set_font(&format!("{}px sans-serif", edge_font / k.max(0.5)));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(label, mx, my);
			ctx.set_text_align("start");
		}
	}
}

fn draw_node(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	color: &str,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(color);
	ctx.fill();
	let border = state.options.nodes.border_width;
	if border > 0.0 {
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.9)");
		ctx.set_line_width(border / state.transform.k);
		ctx.stroke();
	}
}

fn draw_label(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, label: &str, x: f64, y: f64) {
	let font = state.options.nodes.font_size / state.transform.k.max(0.5);
	ctx.set_font(&format!("{font}px sans-serif"));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, x, y + font);
	ctx.set_text_align("start");
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let has_highlight = state.has_active_highlight();
	let t = ease_out_cubic(state.hover.highlight_t);
	let base_radius = state.node_radius();
	let font_color = state.options.nodes.font_color.as_str();

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, base_radius * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		draw_node(state, ctx, x, y, radius, &node.data.user_data.color);
		ctx.set_fill_style_str(font_color);
		draw_label(state, ctx, &node.data.user_data.label, x, y + radius);
		ctx.set_global_alpha(1.0);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(base_radius * (1.0 + 0.35 * t), base_radius * (1.8 + 1.2 * t))
		} else if is_neighbor {
			(base_radius * (1.0 + 0.2 * t), base_radius * (1.4 + 0.6 * t))
		} else {
			(base_radius, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &with_alpha(&node.data.user_data.color, alpha));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		draw_node(state, ctx, x, y, radius, &node.data.user_data.color);
		ctx.set_fill_style_str(font_color);
		draw_label(state, ctx, &node.data.user_data.label, x, y + radius);
	});
}

fn draw_tooltip(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let Some(idx) = state.tooltip_node() else {
		return;
	};
	let mut anchor = None;
	state.graph.visit_nodes(|node| {
		if node.index() == idx {
			anchor = Some((
				node.x() as f64,
				node.y() as f64,
				node.data.user_data.tooltip.clone(),
			));
		}
	});
	let Some((gx, gy, text)) = anchor else {
		return;
	};

	let (sx, sy) = (
		gx * state.transform.k + state.transform.x,
		gy * state.transform.k + state.transform.y,
	);
	let lines: Vec<&str> = text.lines().collect();
	let (line_height, pad) = (16.0, 6.0);
	ctx.set_font("12px sans-serif");
	let width = lines
		.iter()
		.filter_map(|l| ctx.measure_text(l).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max);
	let (bw, bh) = (width + 2.0 * pad, lines.len() as f64 * line_height + pad);
	let (bx, by) = (
		(sx + 12.0).min(state.width - bw).max(0.0),
		(sy + 12.0).min(state.height - bh).max(0.0),
	);

	ctx.set_fill_style_str("rgba(255, 255, 245, 0.95)");
	ctx.fill_rect(bx, by, bw, bh);
	ctx.set_stroke_style_str("#999");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(bx, by, bw, bh);
	ctx.set_fill_style_str("#222");
	for (i, line) in lines.iter().enumerate() {
		if i == 0 {
			ctx.set_font("bold 12px sans-serif");
		} else {
			ctx.set_font("12px sans-serif");
		}
		let _ = ctx.fill_text(line, bx + pad, by + pad + line_height * (i as f64 + 0.7));
	}
}
