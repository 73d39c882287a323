//! Window-less backend for driving a figure from tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vista_engine::coords::Rect;
use vista_engine::device::GpuCaps;
use vista_engine::scene::{DrawCmd, DrawList};
use vista_scene::backend::Backend;
use vista_scene::timer::ManualClock;
use vista_scene::{Figure, FigureConfig, Result};

/// Everything the figure asked of its window.
#[derive(Default)]
pub struct Recording {
    pub frames: Vec<DrawList>,
    pub redraws: usize,
    pub pumps: usize,
    pub make_current: usize,
    pub titles: Vec<String>,
    pub closed: bool,
}

pub struct RecordingBackend {
    pub log: Rc<RefCell<Recording>>,
    pub caps: GpuCaps,
    pub rect: Rect,
}

impl Backend for RecordingBackend {
    fn make_current(&mut self) -> Result<()> {
        self.log.borrow_mut().make_current += 1;
        Ok(())
    }

    fn swap_buffers(&mut self, frame: DrawList) {
        self.log.borrow_mut().frames.push(frame);
    }

    fn post_redraw(&mut self) {
        self.log.borrow_mut().redraws += 1;
    }

    fn process_events(&mut self) {
        self.log.borrow_mut().pumps += 1;
    }

    fn position(&self) -> Rect {
        self.rect
    }

    fn set_position(&mut self, rect: Rect) {
        self.rect = rect;
    }

    fn set_title(&mut self, title: &str) {
        self.log.borrow_mut().titles.push(title.to_string());
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed = true;
    }

    fn caps(&self) -> GpuCaps {
        self.caps
    }
}

pub struct Harness {
    pub figure: Figure,
    pub log: Rc<RefCell<Recording>>,
    pub clock: ManualClock,
}

/// A 400x300 figure on desktop capabilities with a manual clock.
pub fn harness() -> Harness {
    harness_with(GpuCaps::desktop())
}

pub fn harness_with(caps: GpuCaps) -> Harness {
    let log = Rc::new(RefCell::new(Recording::default()));
    let backend = RecordingBackend { log: log.clone(), caps, rect: Rect::new(0.0, 0.0, 400.0, 300.0) };
    let clock = ManualClock::new();
    let figure = Figure::with_clock(Box::new(backend), FigureConfig::default(), Rc::new(clock.clone()));
    Harness { figure, log, clock }
}

/// Names of the commands in a frame, in recording order.
pub fn command_names(frame: &DrawList) -> Vec<&'static str> {
    frame.items().iter().map(|i| i.cmd.name()).collect()
}

pub fn volume_commands(frame: &DrawList) -> Vec<&vista_engine::scene::VolumeCmd> {
    frame
        .items()
        .iter()
        .filter_map(|i| match &i.cmd {
            DrawCmd::Volume(v) => Some(v),
            _ => None,
        })
        .collect()
}

pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * a.abs().max(b.abs()).max(1.0)
}
