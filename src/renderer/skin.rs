//! Per-game palettes

use crate::sim::config::SkinId;
use crate::sim::entity::{CollectibleCategory, HazardCategory, ItemKind, ParticleTint, PowerUpKind};

use super::commands::Rgba;

/// Colors one game is drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgba,
    pub star: Rgba,
    pub avatar: Rgba,
    pub accent: Rgba,
    pub text: Rgba,
    pub muted: Rgba,
    pub bar_fill: Rgba,
    pub bar_back: Rgba,
    pub danger: Rgba,
    pub overlay: Rgba,
}

const WHITE: Rgba = Rgba::rgb(255, 255, 255);
const SKY: Rgba = Rgba::rgb(125, 211, 252);
const VIOLET: Rgba = Rgba::rgb(196, 181, 253);
const YELLOW: Rgba = Rgba::rgb(250, 204, 21);
const ORANGE: Rgba = Rgba::rgb(251, 146, 60);
const RED: Rgba = Rgba::rgb(248, 113, 113);
const GREEN: Rgba = Rgba::rgb(74, 222, 128);
const CYAN: Rgba = Rgba::rgb(103, 232, 249);
const GRAY: Rgba = Rgba::rgb(156, 163, 175);
const BROWN: Rgba = Rgba::rgb(161, 98, 7);
const PINK: Rgba = Rgba::rgb(244, 114, 182);

impl Palette {
    pub fn for_skin(skin: SkinId, high_contrast: bool) -> Self {
        let base = Palette {
            background: Rgba::rgb(2, 6, 23),
            star: WHITE,
            avatar: CYAN,
            accent: VIOLET,
            text: WHITE,
            muted: VIOLET,
            bar_fill: GREEN,
            bar_back: Rgba::rgb(55, 65, 81),
            danger: RED,
            overlay: Rgba::rgb(0, 0, 0).with_alpha(0.7),
        };
        let skinned = match skin {
            SkinId::Collector | SkinId::Classic => base,
            SkinId::Asteroids => Palette {
                background: Rgba::rgb(10, 10, 26),
                avatar: SKY,
                ..base
            },
            SkinId::Parker => Palette {
                background: Rgba::rgb(23, 8, 2),
                avatar: Rgba::rgb(226, 232, 240),
                accent: ORANGE,
                bar_fill: ORANGE,
                ..base
            },
            SkinId::Shield => Palette {
                avatar: SKY,
                accent: YELLOW,
                bar_fill: Rgba::rgb(59, 130, 246),
                ..base
            },
            SkinId::Slingshot => Palette {
                background: Rgba::rgb(15, 23, 42),
                avatar: WHITE,
                accent: CYAN,
                ..base
            },
            SkinId::Rescue => Palette {
                background: Rgba::rgb(3, 7, 30),
                avatar: YELLOW,
                accent: SKY,
                ..base
            },
            SkinId::Mission => Palette {
                background: Rgba::rgb(8, 47, 73),
                accent: SKY,
                ..base
            },
        };
        if high_contrast {
            Palette {
                background: Rgba::rgb(0, 0, 0),
                text: WHITE,
                muted: WHITE,
                bar_back: Rgba::rgb(64, 64, 64),
                overlay: Rgba::rgb(0, 0, 0).with_alpha(0.9),
                ..skinned
            }
        } else {
            skinned
        }
    }

    pub fn item(&self, kind: &ItemKind) -> Rgba {
        match kind {
            ItemKind::Collectible { category, .. } => match category {
                CollectibleCategory::Star => YELLOW,
                CollectibleCategory::DataPacket => CYAN,
                CollectibleCategory::Crystal => PINK,
            },
            ItemKind::Hazard(spec) => match spec.category {
                HazardCategory::Junk => GRAY,
                HazardCategory::Asteroid => BROWN,
                HazardCategory::Flare | HazardCategory::Fragment => ORANGE,
                HazardCategory::MegaFlare => RED,
                HazardCategory::SplitterFlare => YELLOW,
            },
            ItemKind::PowerUp(kind) => self.power_up(*kind),
        }
    }

    pub fn power_up(&self, kind: PowerUpKind) -> Rgba {
        match kind {
            PowerUpKind::Phase => VIOLET,
            PowerUpKind::Laser => RED,
            PowerUpKind::Shield => SKY,
            PowerUpKind::Magnet => GREEN,
        }
    }

    pub fn tint(&self, tint: ParticleTint) -> Rgba {
        match tint {
            ParticleTint::Star => YELLOW,
            ParticleTint::Debris => GRAY,
            ParticleTint::Fire => ORANGE,
            ParticleTint::Data => CYAN,
            ParticleTint::Shield => SKY,
            ParticleTint::Spark => WHITE,
        }
    }
}
