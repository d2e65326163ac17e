use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_frame_duration_and_grace() {
    let fps = Fps::whole(10).unwrap();
    assert_eq!(fps.frame_duration(), Duration::from_millis(100));
    assert_eq!(fps.half_second_frames(), 5);
    assert_eq!(Fps::whole(1).unwrap().half_second_frames(), 1);
}

#[test]
fn fps_ffmpeg_rate_formats() {
    assert_eq!(Fps::whole(30).unwrap().ffmpeg_rate(), "30");
    assert_eq!(Fps::new(30000, 1001).unwrap().ffmpeg_rate(), "30000/1001");
}

#[test]
fn canvas_validation_catches_bad_values() {
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 11,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 600,
            height: 800
        }
        .validate()
        .is_ok()
    );
}

#[test]
fn alpha_scaling_clamps() {
    let c = Rgba8::opaque(10, 20, 30);
    assert_eq!(c.with_alpha_scaled(0.5).a, 128);
    assert_eq!(c.with_alpha_scaled(2.0).a, 255);
}
