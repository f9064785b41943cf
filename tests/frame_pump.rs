// Frame pump integration tests
// Cadence, load failure, stop handling and frame content through the pump

mod common;

use common::{event_log, presents, vblanks, Event, FailingPresenter, RecordingCore, RecordingPresenter};
use gb_present::display::{convert_frame, AtlasBuffer, LogicalFrame};
use gb_present::emulator::{FramePump, PresentConfig, PumpState, StopSignal};
use std::path::PathBuf;

fn config_with_divisor(divisor: u32) -> PresentConfig {
    let mut config = PresentConfig::default();
    config.video.frame_divisor = divisor;
    config
}

#[test]
fn test_launch_configures_audio_before_loading() {
    let log = event_log();
    let mut config = PresentConfig::default();
    config.audio.enabled = true;
    config.boot.use_boot_rom = true;

    let pump = FramePump::launch(RecordingCore::new(&log), "tetris.gb", &config);
    assert!(pump.is_ok());

    assert_eq!(
        *log.borrow(),
        vec![
            Event::ConfigureAudio(true),
            Event::Load {
                path: PathBuf::from("tetris.gb"),
                use_boot_rom: true
            },
        ]
    );
}

#[test]
fn test_default_cadence_three_vblanks_per_present() {
    let log = event_log();
    let mut pump = FramePump::launch(RecordingCore::new(&log), "game.gb", &config_with_divisor(3))
        .expect("launch");
    let mut presenter = RecordingPresenter::new(&log);

    for _ in 0..4 {
        assert_eq!(pump.step(&mut presenter), Ok(PumpState::Running));
    }

    // Only the last vblank of each iteration is captured
    let expected: Vec<bool> = (0..4).flat_map(|_| [false, false, true]).collect();
    assert_eq!(vblanks(&log), expected);
    assert_eq!(presents(&log), 4);
    assert_eq!(pump.presented_frames(), 4);
}

#[test]
fn test_cadence_for_each_divisor() {
    for divisor in 1..=6 {
        let log = event_log();
        let mut pump =
            FramePump::launch(RecordingCore::new(&log), "game.gb", &config_with_divisor(divisor))
                .expect("launch");
        let mut presenter = RecordingPresenter::new(&log);

        pump.step(&mut presenter).unwrap();

        let calls = vblanks(&log);
        assert_eq!(calls.len(), divisor as usize, "divisor {}", divisor);
        assert_eq!(calls.iter().filter(|&&c| c).count(), 1);
        assert_eq!(calls.last(), Some(&true));
    }
}

#[test]
fn test_present_follows_captured_vblank() {
    let log = event_log();
    let mut pump = FramePump::launch(RecordingCore::new(&log), "game.gb", &config_with_divisor(2))
        .expect("launch");
    let mut presenter = RecordingPresenter::new(&log);

    pump.step(&mut presenter).unwrap();

    assert_eq!(
        log.borrow()[2..],
        [
            Event::Vblank { captured: false },
            Event::Vblank { captured: true },
            Event::Present,
        ]
    );
}

#[test]
fn test_presented_atlas_holds_last_vblank() {
    let log = event_log();
    let mut pump = FramePump::launch(RecordingCore::new(&log), "game.gb", &config_with_divisor(3))
        .expect("launch");
    let mut presenter = RecordingPresenter::new(&log);

    pump.step(&mut presenter).unwrap();
    pump.step(&mut presenter).unwrap();

    // Second iteration captures vblank 6
    let atlas = presenter.last.as_ref().expect("presented");
    assert_eq!(atlas.texel(0, 0), [6, 12, 18]);
    assert_eq!(atlas.texel(159, 143), [6, 12, 18]);
    assert_eq!(atlas.texel(160, 0), [0, 0, 0]);
}

#[test]
fn test_load_failure_never_iterates() {
    let log = event_log();
    let result = FramePump::launch(
        RecordingCore::new(&log).failing_load(),
        "missing.gb",
        &PresentConfig::default(),
    );

    assert!(result.is_err());
    assert!(vblanks(&log).is_empty());
    assert_eq!(presents(&log), 0);
}

#[test]
fn test_stop_before_first_iteration() {
    let log = event_log();
    let stop = StopSignal::new();
    let mut pump = FramePump::launch(RecordingCore::new(&log), "game.gb", &PresentConfig::default())
        .expect("launch")
        .with_stop_signal(stop.clone());
    let mut presenter = RecordingPresenter::new(&log);

    stop.raise();
    pump.run(&mut presenter).unwrap();

    assert_eq!(pump.state(), PumpState::Terminated);
    assert!(vblanks(&log).is_empty());
    assert_eq!(presents(&log), 0);
}

#[test]
fn test_stop_mid_iteration_completes_present() {
    let log = event_log();
    let stop = StopSignal::new();
    // Raised during the second vblank of the second iteration
    let core = RecordingCore::new(&log).raising_at(5, stop.clone());
    let mut pump = FramePump::launch(core, "game.gb", &config_with_divisor(3))
        .expect("launch")
        .with_stop_signal(stop);
    let mut presenter = RecordingPresenter::new(&log);

    pump.run(&mut presenter).unwrap();

    assert_eq!(vblanks(&log).len(), 6);
    assert_eq!(presents(&log), 2);
    assert_eq!(pump.presented_frames(), 2);
    assert_eq!(pump.state(), PumpState::Terminated);
    assert_eq!(log.borrow().last(), Some(&Event::Present));
}

#[test]
fn test_stop_raised_from_another_thread() {
    let log = event_log();
    let mut pump = FramePump::launch(RecordingCore::new(&log), "game.gb", &config_with_divisor(1))
        .expect("launch");
    let mut presenter = RecordingPresenter::new(&log);

    pump.step(&mut presenter).unwrap();
    let stop = pump.stop_signal();
    std::thread::spawn(move || stop.raise())
        .join()
        .expect("raise thread");

    assert_eq!(pump.step(&mut presenter), Ok(PumpState::Terminated));
    assert_eq!(presents(&log), 1);
}

#[test]
fn test_skipped_frames_are_not_counted_as_presented() {
    let log = event_log();
    let mut pump = FramePump::launch(RecordingCore::new(&log), "game.gb", &config_with_divisor(1))
        .expect("launch");
    let mut presenter = RecordingPresenter::new(&log).skipping(&[1, 2]);

    for _ in 0..4 {
        assert_eq!(pump.step(&mut presenter), Ok(PumpState::Running));
    }

    assert_eq!(presents(&log), 4);
    assert_eq!(pump.presented_frames(), 2);
    assert_eq!(pump.skipped_frames(), 2);
    // The last shown atlas is from the fourth vblank
    let atlas = presenter.last.as_ref().expect("presented");
    assert_eq!(atlas.texel(0, 0), [4, 8, 12]);
}

#[test]
fn test_presenter_error_stops_run() {
    let log = event_log();
    let mut pump = FramePump::launch(RecordingCore::new(&log), "game.gb", &PresentConfig::default())
        .expect("launch");

    let err = pump.run(&mut FailingPresenter).unwrap_err();
    assert_eq!(err, "display lost");
    assert_eq!(pump.presented_frames(), 0);
}

#[test]
fn test_non_gameboy_frame_size() {
    let log = event_log();
    let core = RecordingCore::new(&log).with_size(256, 240);
    let mut pump = FramePump::launch(core, "game.nes", &config_with_divisor(1)).expect("launch");
    let mut presenter = RecordingPresenter::new(&log);

    pump.step(&mut presenter).unwrap();

    let atlas = presenter.last.as_ref().expect("presented");
    assert_eq!((atlas.width(), atlas.height()), (256, 256));
    assert_eq!(atlas.texel(255, 239), [1, 2, 3]);
    assert_eq!(atlas.texel(0, 240), [0, 0, 0]);
}

#[test]
fn test_conversion_is_idempotent() {
    let mut frame = LogicalFrame::gameboy();
    for (i, pixel) in frame.as_mut_slice().iter_mut().enumerate() {
        pixel.red = i as u8;
        pixel.green = (i >> 8) as u8;
        pixel.blue = 0x80;
    }

    let mut once = AtlasBuffer::new(160, 144);
    convert_frame(&frame, &mut once);
    let mut twice = once.clone();
    convert_frame(&frame, &mut twice);

    assert_eq!(once, twice);
}
