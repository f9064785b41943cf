// Presentation geometry tests
// Sweeps common screen sizes and checks the placement invariants hold

use gb_present::display::{AtlasBuffer, DisplayGeometry, UndersizedScreen};

const SCREENS: [(u32, u32); 10] = [
    (160, 144),
    (320, 240),
    (640, 480),
    (800, 600),
    (1024, 768),
    (1280, 720),
    (1280, 1024),
    (1366, 768),
    (1920, 1080),
    (3840, 2160),
];

const FRAMES: [(u32, u32); 3] = [(160, 144), (256, 240), (240, 160)];

#[test]
fn test_zoom_is_largest_integer_that_fits() {
    for &(sw, sh) in &SCREENS {
        for &(w, h) in &FRAMES {
            if sw < w || sh < h {
                continue;
            }
            let g = DisplayGeometry::compute(sw, sh, w, h, UndersizedScreen::Fail).unwrap();

            assert!(g.zoom >= 1);
            assert!(w * g.zoom <= sw && h * g.zoom <= sh);
            assert!(
                w * (g.zoom + 1) > sw || h * (g.zoom + 1) > sh,
                "{}x{} on {}x{} could use zoom {}",
                w,
                h,
                sw,
                sh,
                g.zoom + 1
            );
        }
    }
}

#[test]
fn test_scaled_frame_is_centered() {
    for &(sw, sh) in &SCREENS {
        for &(w, h) in &FRAMES {
            if sw < w || sh < h {
                continue;
            }
            let g = DisplayGeometry::compute(sw, sh, w, h, UndersizedScreen::Fail).unwrap();

            assert_eq!((g.width, g.height), (w * g.zoom, h * g.zoom));
            assert_eq!(g.offset_x, ((sw - g.width) / 2) as i32);
            assert_eq!(g.offset_y, ((sh - g.height) / 2) as i32);

            // Margins differ by at most one pixel
            let right = sw as i32 - g.offset_x - g.width as i32;
            let bottom = sh as i32 - g.offset_y - g.height as i32;
            assert!((right - g.offset_x) == 0 || (right - g.offset_x) == 1);
            assert!((bottom - g.offset_y) == 0 || (bottom - g.offset_y) == 1);
        }
    }
}

#[test]
fn test_quad_stays_on_screen() {
    for &(sw, sh) in &SCREENS {
        let g = DisplayGeometry::compute(sw, sh, 160, 144, UndersizedScreen::Fail).unwrap();
        for [x, y] in g.quad_vertices() {
            assert!((0..=sw as i32).contains(&x));
            assert!((0..=sh as i32).contains(&y));
        }
    }
}

#[test]
fn test_undersized_policies() {
    assert!(DisplayGeometry::compute(100, 100, 160, 144, UndersizedScreen::Fail).is_err());

    let g = DisplayGeometry::compute(100, 100, 160, 144, UndersizedScreen::Clamp).unwrap();
    assert_eq!(g.zoom, 1);
    assert_eq!((g.offset_x, g.offset_y), (-30, -22));
}

#[test]
fn test_atlas_extent_matches_frame_fraction() {
    for &(w, h) in &FRAMES {
        let atlas = AtlasBuffer::new(w as usize, h as usize);
        let (u, v) = atlas.tex_coord_extent();

        assert!(u > 0.5 && u <= 1.0);
        assert!(v > 0.5 && v <= 1.0);
        assert_eq!(u * atlas.width() as f32, w as f32);
        assert_eq!(v * atlas.height() as f32, h as f32);
    }
}
