//! Closed catalogs of presentation options.
//!
//! Wishes and slides only store the ids; rendering is the client's job.

use serde::Serialize;

/// A named catalog entry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogItem {
    pub id: &'static str,
    pub name: &'static str,
}

/// A preset background track.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MusicPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub duration: &'static str,
    pub genre: &'static str,
    pub url: &'static str,
}

pub const FRAME_SHAPES: &[CatalogItem] = &[
    CatalogItem { id: "rectangle", name: "Rectangle" },
    CatalogItem { id: "circle", name: "Circle" },
    CatalogItem { id: "rounded", name: "Rounded Square" },
    CatalogItem { id: "heart", name: "Heart" },
    CatalogItem { id: "star", name: "Star" },
    CatalogItem { id: "hexagon", name: "Hexagon" },
    CatalogItem { id: "diamond", name: "Diamond" },
    CatalogItem { id: "cloud", name: "Cloud" },
    CatalogItem { id: "polaroid", name: "Polaroid" },
    CatalogItem { id: "wave", name: "Wave" },
];

pub const GRADIENTS: &[CatalogItem] = &[
    CatalogItem { id: "sunset", name: "Sunset Dreams" },
    CatalogItem { id: "ocean", name: "Ocean Breeze" },
    CatalogItem { id: "forest", name: "Forest Magic" },
    CatalogItem { id: "cosmic", name: "Cosmic Voyage" },
    CatalogItem { id: "golden", name: "Golden Hour" },
    CatalogItem { id: "aurora", name: "Aurora Borealis" },
    CatalogItem { id: "candy", name: "Cotton Candy" },
    CatalogItem { id: "fire", name: "Fire Glow" },
    CatalogItem { id: "mint", name: "Mint Fresh" },
    CatalogItem { id: "royal", name: "Royal Purple" },
];

pub const TRANSITIONS: &[CatalogItem] = &[
    CatalogItem { id: "fade", name: "Fade" },
    CatalogItem { id: "slide-left", name: "Slide Left" },
    CatalogItem { id: "slide-right", name: "Slide Right" },
    CatalogItem { id: "slide-up", name: "Slide Up" },
    CatalogItem { id: "slide-down", name: "Slide Down" },
    CatalogItem { id: "zoom-in", name: "Zoom In" },
    CatalogItem { id: "zoom-out", name: "Zoom Out" },
    CatalogItem { id: "rotate", name: "Rotate" },
    CatalogItem { id: "flip", name: "Flip" },
    CatalogItem { id: "blur", name: "Blur Fade" },
];

pub const MUSIC_PRESETS: &[MusicPreset] = &[
    MusicPreset {
        id: "happy-classic",
        name: "Happy Birthday Classic",
        duration: "2:30",
        genre: "Traditional",
        url: "/music/happy-classic.mp3",
    },
    MusicPreset {
        id: "jazz-celebration",
        name: "Jazz Celebration",
        duration: "3:15",
        genre: "Jazz",
        url: "/music/jazz-celebration.mp3",
    },
    MusicPreset {
        id: "upbeat-party",
        name: "Upbeat Party",
        duration: "2:45",
        genre: "Pop",
        url: "/music/upbeat-party.mp3",
    },
    MusicPreset {
        id: "gentle-wishes",
        name: "Gentle Wishes",
        duration: "3:00",
        genre: "Ambient",
        url: "/music/gentle-wishes.mp3",
    },
    MusicPreset {
        id: "dance-vibes",
        name: "Dance Vibes",
        duration: "2:50",
        genre: "Dance",
        url: "/music/dance-vibes.mp3",
    },
    MusicPreset {
        id: "acoustic-dreams",
        name: "Acoustic Dreams",
        duration: "3:20",
        genre: "Acoustic",
        url: "/music/acoustic-dreams.mp3",
    },
    MusicPreset {
        id: "electronic-burst",
        name: "Electronic Burst",
        duration: "2:40",
        genre: "Electronic",
        url: "/music/electronic-burst.mp3",
    },
    MusicPreset {
        id: "orchestral-grand",
        name: "Orchestral Grand",
        duration: "3:30",
        genre: "Orchestral",
        url: "/music/orchestral-grand.mp3",
    },
];

/// Default slide frame.
pub const DEFAULT_FRAME_SHAPE: &str = "rectangle";

/// Default slide transition.
pub const DEFAULT_TRANSITION: &str = "fade";

pub fn is_frame_shape(id: &str) -> bool {
    FRAME_SHAPES.iter().any(|item| item.id == id)
}

pub fn is_gradient(id: &str) -> bool {
    GRADIENTS.iter().any(|item| item.id == id)
}

pub fn is_transition(id: &str) -> bool {
    TRANSITIONS.iter().any(|item| item.id == id)
}

pub fn music_preset(id: &str) -> Option<&'static MusicPreset> {
    MUSIC_PRESETS.iter().find(|preset| preset.id == id)
}

/// Full catalog as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub frame_shapes: &'static [CatalogItem],
    pub gradients: &'static [CatalogItem],
    pub transitions: &'static [CatalogItem],
    pub music_presets: &'static [MusicPreset],
}

pub fn catalog() -> Catalog {
    Catalog {
        frame_shapes: FRAME_SHAPES,
        gradients: GRADIENTS,
        transitions: TRANSITIONS,
        music_presets: MUSIC_PRESETS,
    }
}
