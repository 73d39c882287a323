//! End-to-end scenarios: a figure driven through a recording backend, from
//! building the tree to pixels in the pick buffer.

mod common;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glam::DVec3;
use vista_engine::input::MouseButton;
use vista_engine::scene::{TextureOp, VolumeStyle};
use vista_math::{Aarray, Pointset, Range};
use vista_scene::axis::{cartesian, Axis, AxisStyle};
use vista_scene::events::EventKind;
use vista_scene::line::Line;
use vista_scene::node::{Behavior, NodeId, Pattern, Position};
use vista_scene::texture::{Colormap, ColormapSpec, Texture3D};
use vista_scene::MouseInput;

use common::{close, command_names, harness, volume_commands, Harness};

fn tent() -> Pointset {
    Pointset::from_flat(2, &[0.0, 0.0, 1.0, 1.0, 2.0, 0.0]).unwrap()
}

/// Axes of 200x200 pixels at (40, 20) holding the tent line.
fn square_plot(h: &mut Harness, margin: f64) -> (NodeId, NodeId) {
    let fig = &mut h.figure;
    let root = fig.root();
    let axes = fig.add_axes_in(root, Position::new(0.0, 0.0, 260.0, 260.0)).unwrap();
    let line = fig.add_object(axes, Line::new(&tent())).unwrap();
    fig.set_limits(axes, margin).unwrap();
    (axes, line)
}

// ── 2-D plot then pan ─────────────────────────────────────────────────────

#[test]
fn plot_resets_to_data_and_pans_with_left_drag() {
    let mut h = harness();
    let (axes, _) = square_plot(&mut h, 0.0);
    let fig = &mut h.figure;
    assert_eq!(fig.scene().rect(axes).w, 200.0);

    fig.reset_camera(axes).unwrap();
    let v = fig.axes(axes).unwrap().view_params();
    assert!(close(v.loc.x, 1.0) && close(v.loc.y, 0.5));
    // x spans 2, y spans 1; a square viewport shows the larger in both.
    assert!(close(v.zoom.0, 2.0) && close(v.zoom.1, 2.0));

    fig.paint().unwrap();
    let (cx, cy) = (140.0, 120.0);
    fig.mouse(EventKind::MouseDown, MouseInput::at(cx, cy).button(MouseButton::Left));
    fig.mouse(EventKind::Motion, MouseInput::at(cx + 100.0, cy));
    fig.mouse(EventKind::MouseUp, MouseInput::at(cx + 100.0, cy).button(MouseButton::Left));

    let after = fig.axes(axes).unwrap().view_params();
    assert!(close(after.loc.x, v.loc.x - 100.0 * v.zoom.0 / 200.0));
    assert!(close(after.loc.y, v.loc.y));
}

#[test]
fn mouse_up_reaches_the_pressed_node_once() {
    let mut h = harness();
    let (axes, _) = square_plot(&mut h, 0.0);
    let fig = &mut h.figure;
    let ups = Rc::new(RefCell::new(0));
    let u = ups.clone();
    fig.scene_mut()
        .bind(axes, EventKind::MouseUp, None, Box::new(move |_| {
            *u.borrow_mut() += 1;
            false
        }))
        .unwrap();
    fig.paint().unwrap();
    fig.mouse(EventKind::MouseDown, MouseInput::at(140.0, 120.0).button(MouseButton::Left));
    // Released far outside the axes.
    fig.mouse(EventKind::MouseUp, MouseInput::at(395.0, 295.0).button(MouseButton::Left));
    fig.mouse(EventKind::MouseUp, MouseInput::at(395.0, 295.0).button(MouseButton::Left));
    assert_eq!(*ups.borrow(), 1);
}

fn record(h: &mut Harness, id: NodeId, name: &'static str, kind: EventKind, log: &Rc<RefCell<Vec<String>>>) {
    let log = log.clone();
    let label = match kind {
        EventKind::Enter => "enter",
        EventKind::Leave => "leave",
        _ => "motion",
    };
    h.figure
        .scene_mut()
        .bind(id, kind, None, Box::new(move |_| {
            log.borrow_mut().push(format!("{name} {label}"));
            false
        }))
        .unwrap();
}

#[test]
fn hover_enters_top_down_before_motion_and_leaves_bottom_up() {
    let mut h = harness();
    let (axes, line) = square_plot(&mut h, 0.1);
    let root = h.figure.root();
    let log = Rc::new(RefCell::new(Vec::new()));
    for (id, name) in [(axes, "axes"), (line, "line")] {
        for kind in [EventKind::Enter, EventKind::Leave, EventKind::Motion] {
            record(&mut h, id, name, kind, &log);
        }
    }
    record(&mut h, root, "root", EventKind::Motion, &log);
    h.figure.paint().unwrap();

    let outside = MouseInput::at(390.0, 290.0);
    h.figure.mouse(EventKind::Motion, outside);
    // Motion listeners hear it even off their area.
    assert_eq!(*log.borrow(), ["root motion", "axes motion", "line motion"]);
    log.borrow_mut().clear();

    let peak = h.figure.world_to_screen(axes, DVec3::new(1.0, 1.0, 0.0)).unwrap();
    assert_eq!(h.figure.pick_at(peak.x as f32, peak.y as f32).last(), Some(&line));
    h.figure.mouse(EventKind::Motion, MouseInput::at(peak.x as f32, peak.y as f32));
    assert_eq!(*log.borrow(), ["axes enter", "line enter", "root motion", "axes motion", "line motion"]);
    log.borrow_mut().clear();

    // Staying on the line enters nothing new.
    h.figure.mouse(EventKind::Motion, MouseInput::at(peak.x as f32, peak.y as f32));
    assert_eq!(*log.borrow(), ["root motion", "axes motion", "line motion"]);
    log.borrow_mut().clear();

    h.figure.mouse(EventKind::Motion, outside);
    assert_eq!(*log.borrow(), ["line leave", "axes leave", "root motion", "axes motion", "line motion"]);
}

// ── picking ───────────────────────────────────────────────────────────────

#[test]
fn shape_pass_picks_the_line_and_falls_back_to_the_axes() {
    let mut h = harness();
    let (axes, line) = square_plot(&mut h, 0.1);
    let fig = &mut h.figure;
    let flat = fig.add_object(axes, Line::new(&Pointset::from_flat(2, &[0.0, 0.0, 2.0, 0.0]).unwrap())).unwrap();
    for id in [line, flat] {
        fig.scene_mut().set_hit_test(id, true).unwrap();
    }
    fig.paint().unwrap();

    let peak = fig.world_to_screen(axes, DVec3::new(1.0, 1.0, 0.0)).unwrap();
    let chain = fig.pick_at(peak.x as f32, peak.y as f32);
    assert_eq!(chain.last(), Some(&line));
    let expected = fig.scene().node(line).unwrap().draw_id().unwrap();
    let rgb = fig.pick_buffer().unwrap().pixel(peak.x.floor() as i32, peak.y.floor() as i32).unwrap();
    assert_eq!(rgb[0] as u32 + ((rgb[1] as u32) << 8) + ((rgb[2] as u32) << 16), expected);

    // Between the tent and the flat line only the axes is hit.
    let gap = fig.world_to_screen(axes, DVec3::new(1.0, 0.25, 0.0)).unwrap();
    let chain = fig.pick_at(gap.x as f32, gap.y as f32);
    assert_eq!(chain.last(), Some(&axes));
    assert!(chain.contains(&fig.root()));
}

#[test]
fn pixels_outside_every_widget_pick_the_root() {
    let mut h = harness();
    square_plot(&mut h, 0.0);
    h.figure.paint().unwrap();
    assert_eq!(h.figure.pick_at(390.0, 290.0), vec![h.figure.root()]);
}

// ── axis text ─────────────────────────────────────────────────────────────

#[test]
fn tick_labels_share_a_fixed_precision() {
    let mut h = harness();
    let fig = &mut h.figure;
    let axes = fig.add_axes().unwrap();
    // y is the tighter dimension, so x shows a little more than [0, 1.0001].
    fig.set_limits_to(axes, Range::new(0.0, 1.0001), Range::new(0.0, 0.85), None).unwrap();
    fig.paint().unwrap();

    let axis = fig.scene().find_objects(axes, &Pattern::of::<Axis>())[0];
    let texts: Vec<String> = fig
        .scene()
        .behavior::<Axis>(axis)
        .unwrap()
        .geometry()
        .ticks
        .iter()
        .filter(|t| t.dim == 0)
        .map(|t| t.text.clone())
        .collect();
    assert_eq!(texts, ["0.0000", "0.2000", "0.4000", "0.6000", "0.8000", "1.0000"]);
}

#[test]
fn collapsed_limits_give_no_ticks() {
    let mut limits = [Range::new(3.0, 3.0), Range::new(0.0, 1.0), Range::new(0.0, 0.0)];
    let project = |p: DVec3| Some(DVec3::new(10.0 + p.x * 100.0, 110.0 - p.y * 100.0, 0.5));
    let style = AxisStyle::default();
    let g = cartesian::generate_2d(&limits, &style, 40.0, &project);
    assert!(g.ticks.iter().all(|t| t.dim != 0));
    assert_eq!(g.units[0], None);
    assert!(g.ticks.iter().any(|t| t.dim == 1));

    limits[1] = Range::new(0.5, 0.5);
    let g = cartesian::generate_2d(&limits, &style, 40.0, &project);
    assert!(g.ticks.is_empty());
}

// ── volume ────────────────────────────────────────────────────────────────

fn ramp_volume() -> Texture3D {
    let n = 32;
    let data: Vec<f32> = (0..n * n * n).map(|i| (i % n) as f32 / (n - 1) as f32).collect();
    Texture3D::new(Aarray::new(data, vec![n, n, n]).unwrap()).unwrap()
}

#[test]
fn volume_under_narrow_clim_saturates() {
    let mut h = harness();
    let fig = &mut h.figure;
    let axes = fig.add_axes().unwrap();
    fig.axes_mut(axes).unwrap().set_camera_type("3d").unwrap();
    let vol = fig.add_object(axes, ramp_volume()).unwrap();
    fig.set_limits(axes, 0.0).unwrap();
    {
        let v = fig.scene_mut().behavior_mut::<Texture3D>(vol).unwrap();
        v.set_style(VolumeStyle::Mip);
        v.set_clim(Range::new(0.0, 0.5)).unwrap();
    }
    fig.paint().unwrap();

    let log = h.log.borrow();
    let frame = log.frames.last().unwrap();
    assert!(frame.texture_ops().iter().any(|op| matches!(op, TextureOp::Create { .. })));
    let cmds = volume_commands(frame);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].style, VolumeStyle::Mip);
    // The window doubles the normalized value: 1.0 maps to 2.0 and clamps.
    assert_eq!((cmds[0].clim_scale, cmds[0].clim_bias), (2.0, 0.0));

    let v = h.figure.scene().behavior::<Texture3D>(vol).unwrap();
    let s = v.sample_ray(DVec3::new(16.2, 15.5, -100.0), DVec3::new(16.2, 15.5, 100.0), 1.0).unwrap().unwrap();
    assert_eq!(s.level, 1.0);
    assert_eq!(s.color[0], 255);
}

// ── colormap ──────────────────────────────────────────────────────────────

#[test]
fn channel_dict_resamples_to_the_table() {
    let mut d = BTreeMap::new();
    d.insert("r".to_string(), vec![(0.0, 0.0), (1.0, 1.0)]);
    d.insert("g".to_string(), vec![(0.0, 0.0), (1.0, 0.0)]);
    d.insert("b".to_string(), vec![(0.0, 1.0), (1.0, 0.0)]);
    d.insert("a".to_string(), vec![(0.0, 1.0), (1.0, 1.0)]);
    let map = Colormap::new(&ColormapSpec::Dict(d)).unwrap();
    let t = map.table();
    assert_eq!(t.len(), 256);
    assert_eq!(t[0], [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(t[255], [1.0, 0.0, 0.0, 1.0]);
    assert!((t[128][0] - 0.5).abs() < 0.01);
}

// ── teardown ──────────────────────────────────────────────────────────────

struct Probe {
    index: usize,
    log: Rc<RefCell<Vec<String>>>,
}

impl Behavior for Probe {
    fn type_name(&self) -> &'static str {
        "Probe"
    }

    fn on_destroy_gpu(&mut self, _releases: &mut Vec<TextureOp>) {
        self.log.borrow_mut().push(format!("gpu {}", self.index));
    }

    fn on_destroy(&mut self) {
        self.log.borrow_mut().push(format!("drop {}", self.index));
    }
}

#[test]
fn destroying_axes_tears_down_objects_first() {
    let mut h = harness();
    let fig = &mut h.figure;
    let log = Rc::new(RefCell::new(Vec::new()));
    let axes = fig.add_axes().unwrap();
    let container = fig.scene().parent(axes).unwrap();
    let objects: Vec<NodeId> =
        (0..10).map(|index| fig.add_object(axes, Probe { index, log: log.clone() }).unwrap()).collect();

    let order = fig.destroy(axes);
    let at = |id: NodeId| order.iter().position(|&n| n == id).unwrap();
    for &o in &objects {
        assert!(at(o) < at(axes));
        assert!(!fig.scene().contains(o));
    }
    assert!(at(axes) < at(container));
    assert!(!fig.scene().children(fig.root()).contains(&container));

    let log = log.borrow();
    assert_eq!(log.iter().filter(|l| l.starts_with("gpu")).count(), 10);
    for i in 0..10 {
        let gpu = log.iter().position(|l| *l == format!("gpu {i}")).unwrap();
        let drop = log.iter().position(|l| *l == format!("drop {i}")).unwrap();
        assert!(gpu < drop);
    }
}

#[test]
fn frame_lists_every_drawn_kind() {
    let mut h = harness();
    square_plot(&mut h, 0.05);
    h.figure.paint().unwrap();
    let log = h.log.borrow();
    let names = command_names(log.frames.last().unwrap());
    assert!(names.contains(&"mesh"));
    assert!(names.contains(&"lines"));
}
