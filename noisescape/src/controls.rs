//! Live-tunable parameters and their change tracking.
//!
//! The control panel (here: keyboard bindings) mutates the live
//! [`ControlPanel`] through setters that clamp to the UI ranges and
//! raise a per-field dirty flag. The tick loop reads the state once
//! per frame through [`ControlPanel::snapshot`], which returns an
//! immutable copy plus which fields changed, and clears the flags.
//! Consumers therefore react to a change exactly once.

use geometry::MAX_SUBDIVISIONS;

pub const INTENSITY_RANGE: (f32, f32) = (1.0, 10.0);
pub const FREQUENCY_RANGE: (f32, f32) = (1.0, 10.0);

/// Palette cycled by the recolor binding; starts at the default
/// warm yellow of the original scene.
pub const PALETTE: [[u8; 4]; 6] = [
    [242, 206, 33, 255],
    [217, 82, 60, 255],
    [86, 178, 109, 255],
    [64, 110, 217, 255],
    [235, 235, 235, 255],
    [0, 0, 0, 255],
];

#[derive(Default)]
struct Dirty {
    tessellation: bool,
    color: bool,
    intensity: bool,
    frequency: bool,
}

/// Live control state owned by the application loop.
pub struct ControlPanel {
    tessellation: u32,
    color: [u8; 4],
    palette_index: usize,
    intensity: f32,
    frequency: f32,
    load_scene: bool,
    dirty: Dirty,
}

/// Immutable per-tick view of the control state. `*_changed` flags
/// report fields mutated since the previous snapshot.
#[derive(Clone, Copy, Debug)]
pub struct ControlSnapshot {
    pub tessellation: u32,
    pub color: [u8; 4],
    pub intensity: f32,
    pub frequency: f32,
    pub tessellation_changed: bool,
    pub color_changed: bool,
    pub intensity_changed: bool,
    pub frequency_changed: bool,
    pub load_scene: bool,
}

impl ControlPanel {
    /// All fields start dirty so the first tick pushes the initial
    /// values to the renderer and shader programs.
    pub fn new(tessellation: u32) -> Self {
        Self {
            tessellation: tessellation.min(MAX_SUBDIVISIONS),
            color: PALETTE[0],
            palette_index: 0,
            intensity: 2.2,
            frequency: 2.0,
            load_scene: false,
            dirty: Dirty {
                tessellation: true,
                color: true,
                intensity: true,
                frequency: true,
            },
        }
    }

    pub fn set_tessellation(&mut self, level: u32) {
        let level = level.min(MAX_SUBDIVISIONS);
        if level != self.tessellation {
            self.tessellation = level;
            self.dirty.tessellation = true;
        }
    }

    pub fn set_color(&mut self, color: [u8; 4]) {
        if color != self.color {
            self.color = color;
            self.dirty.color = true;
        }
    }

    /// Advance to the next palette entry.
    pub fn cycle_color(&mut self) {
        self.palette_index = (self.palette_index + 1) % PALETTE.len();
        self.set_color(PALETTE[self.palette_index]);
    }

    pub fn adjust_intensity(&mut self, delta: f32) {
        let next = (self.intensity + delta).clamp(INTENSITY_RANGE.0, INTENSITY_RANGE.1);
        if (next - self.intensity).abs() > f32::EPSILON {
            self.intensity = next;
            self.dirty.intensity = true;
        }
    }

    pub fn adjust_frequency(&mut self, delta: f32) {
        let next = (self.frequency + delta).clamp(FREQUENCY_RANGE.0, FREQUENCY_RANGE.1);
        if (next - self.frequency).abs() > f32::EPSILON {
            self.frequency = next;
            self.dirty.frequency = true;
        }
    }

    pub fn request_load_scene(&mut self) {
        self.load_scene = true;
    }

    pub fn tessellation(&self) -> u32 {
        self.tessellation
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Read-once-per-tick: returns the current values plus change
    /// flags, then clears the flags and the load-scene trigger.
    pub fn snapshot(&mut self) -> ControlSnapshot {
        let snapshot = ControlSnapshot {
            tessellation: self.tessellation,
            color: self.color,
            intensity: self.intensity,
            frequency: self.frequency,
            tessellation_changed: self.dirty.tessellation,
            color_changed: self.dirty.color,
            intensity_changed: self.dirty.intensity,
            frequency_changed: self.dirty.frequency,
            load_scene: self.load_scene,
        };
        self.dirty = Dirty::default();
        self.load_scene = false;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drained(panel: &mut ControlPanel) -> &mut ControlPanel {
        panel.snapshot();
        panel
    }

    #[test]
    fn first_snapshot_reports_everything_dirty() {
        let mut panel = ControlPanel::new(5);
        let snap = panel.snapshot();
        assert!(snap.tessellation_changed);
        assert!(snap.color_changed);
        assert!(snap.intensity_changed);
        assert!(snap.frequency_changed);
    }

    #[test]
    fn color_change_is_reported_exactly_once() {
        let mut panel = ControlPanel::new(5);
        drained(&mut panel).set_color([0, 0, 0, 255]);
        let snap = panel.snapshot();
        assert!(snap.color_changed);
        assert_eq!(snap.color, [0, 0, 0, 255]);
        assert!(!panel.snapshot().color_changed);
    }

    #[test]
    fn unchanged_writes_do_not_mark_dirty() {
        let mut panel = ControlPanel::new(5);
        drained(&mut panel).set_color(PALETTE[0]);
        assert!(!panel.snapshot().color_changed);
        drained(&mut panel).set_tessellation(5);
        assert!(!panel.snapshot().tessellation_changed);
    }

    #[test]
    fn tessellation_is_clamped() {
        let mut panel = ControlPanel::new(5);
        drained(&mut panel).set_tessellation(42);
        let snap = panel.snapshot();
        assert!(snap.tessellation_changed);
        assert_eq!(snap.tessellation, MAX_SUBDIVISIONS);
    }

    #[test]
    fn intensity_and_frequency_stay_in_range() {
        let mut panel = ControlPanel::new(5);
        for _ in 0..100 {
            panel.adjust_intensity(0.2);
            panel.adjust_frequency(1.0);
        }
        assert_eq!(panel.intensity(), INTENSITY_RANGE.1);
        assert_eq!(panel.frequency(), FREQUENCY_RANGE.1);
        for _ in 0..100 {
            panel.adjust_intensity(-0.2);
            panel.adjust_frequency(-1.0);
        }
        assert_eq!(panel.intensity(), INTENSITY_RANGE.0);
        assert_eq!(panel.frequency(), FREQUENCY_RANGE.0);
    }

    #[test]
    fn load_scene_trigger_clears_after_snapshot() {
        let mut panel = ControlPanel::new(5);
        drained(&mut panel).request_load_scene();
        assert!(panel.snapshot().load_scene);
        assert!(!panel.snapshot().load_scene);
    }
}
