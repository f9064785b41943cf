// Common test utilities for frame pump integration tests
//
// A recording core and presenter share one event log, so tests can check
// both what happened and in which order.

#![allow(dead_code)]

use gb_present::display::{AtlasBuffer, Color, LogicalFrame};
use gb_present::emulator::{EmulatorCore, LoadError, PresentOutcome, Presenter, StopSignal};
use std::cell::RefCell;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Something the core or presenter was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ConfigureAudio(bool),
    Load { path: PathBuf, use_boot_rom: bool },
    Vblank { captured: bool },
    Present,
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Number of `Present` events in the log
pub fn presents(log: &EventLog) -> usize {
    log.borrow()
        .iter()
        .filter(|e| **e == Event::Present)
        .count()
}

/// Capture flags of every vblank, in order
pub fn vblanks(log: &EventLog) -> Vec<bool> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Vblank { captured } => Some(*captured),
            _ => None,
        })
        .collect()
}

/// Core that logs every call and paints captured frames with its vblank count
pub struct RecordingCore {
    log: EventLog,
    size: (usize, usize),
    vblanks: u32,
    fail_load: bool,
    /// Raise this signal during the given vblank (1-based)
    raise_at: Option<(u32, StopSignal)>,
}

impl RecordingCore {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: Rc::clone(log),
            size: (160, 144),
            vblanks: 0,
            fail_load: false,
            raise_at: None,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.size = (width, height);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn raising_at(mut self, vblank: u32, stop: StopSignal) -> Self {
        self.raise_at = Some((vblank, stop));
        self
    }
}

impl EmulatorCore for RecordingCore {
    fn frame_size(&self) -> (usize, usize) {
        self.size
    }

    fn run_to_vblank(&mut self, frame: Option<&mut LogicalFrame>) {
        self.vblanks += 1;
        self.log.borrow_mut().push(Event::Vblank {
            captured: frame.is_some(),
        });

        if let Some(frame) = frame {
            let v = self.vblanks as u8;
            frame.clear(Color::rgb(v, v.wrapping_mul(2), v.wrapping_mul(3)));
        }

        if let Some((at, stop)) = &self.raise_at {
            if *at == self.vblanks {
                stop.raise();
            }
        }
    }

    fn load_program_image(&mut self, path: &Path, use_boot_rom: bool) -> Result<(), LoadError> {
        self.log.borrow_mut().push(Event::Load {
            path: path.to_path_buf(),
            use_boot_rom,
        });

        if self.fail_load {
            Err(LoadError::Empty {
                path: path.to_path_buf(),
            })
        } else {
            Ok(())
        }
    }

    fn configure_audio(&mut self, enabled: bool) {
        self.log.borrow_mut().push(Event::ConfigureAudio(enabled));
    }
}

/// Presenter that logs each present and keeps a copy of the last atlas
pub struct RecordingPresenter {
    log: EventLog,
    pub last: Option<AtlasBuffer>,
    /// Report these calls (0-based) as skipped
    skip: Vec<usize>,
    calls: usize,
}

impl RecordingPresenter {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: Rc::clone(log),
            last: None,
            skip: Vec::new(),
            calls: 0,
        }
    }

    pub fn skipping(mut self, calls: &[usize]) -> Self {
        self.skip = calls.to_vec();
        self
    }
}

impl Presenter for RecordingPresenter {
    type Error = Infallible;

    fn present(&mut self, atlas: &AtlasBuffer) -> Result<PresentOutcome, Infallible> {
        let call = self.calls;
        self.calls += 1;
        self.log.borrow_mut().push(Event::Present);

        if self.skip.contains(&call) {
            return Ok(PresentOutcome::Skipped);
        }
        self.last = Some(atlas.clone());
        Ok(PresentOutcome::Presented)
    }
}

/// Presenter that fails on its first call
pub struct FailingPresenter;

impl Presenter for FailingPresenter {
    type Error = String;

    fn present(&mut self, _atlas: &AtlasBuffer) -> Result<PresentOutcome, String> {
        Err("display lost".to_string())
    }
}
