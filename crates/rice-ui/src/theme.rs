//! Colors, fonts, effects and generated backgrounds shared by the widgets.
//!
//! A [`ThemeConfig`] is built once and handed to widgets as an
//! `Arc<ThemeConfig>`. Generated gradient backgrounds are cached by size.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rice_canvas::{GradientDirection, gradient_round_rect};
use rice_core::{Font, Image};

use crate::effect::Effect;

pub const WHITE: u32 = 0xFFFF_FFFF;
pub const BLACK: u32 = 0xFF00_0000;
pub const RED: u32 = 0xFFFF_0000;
pub const TRANSPARENT: u32 = 0;

pub const FORM_BGCOLOR: u32 = WHITE;
pub const DIALOG_BGCOLOR_BEGIN: u32 = 0x1080_8080;
pub const DIALOG_BGCOLOR_END: u32 = 0x8080_8080;
pub const SELECTED_BGCOLOR: u32 = 0xFFFF_C891;
pub const MENU_ITEM_BGCOLOR: u32 = 0xE0FF_FFFF;
pub const APPINFO_BUTTON_FGCOLOR: u32 = 0xFF40_4040;

pub const SHADOW_COLOR: u32 = 0xC000_0000;
pub const SHADOW_START_COLOR: u32 = 0xF040_4040;
pub const SHADOW_END_COLOR: u32 = 0x2080_8080;
pub const BORDER_SHADOW_WIDTH: i32 = 6;

pub const TITLEBAR_BG_START_COLOR: u32 = 0xFF48_7DB3;
pub const TITLEBAR_BG_END_COLOR: u32 = 0xFF19_4E84;
pub const TITLEBAR_BG_BORDER_COLOR: u32 = 0xFF19_4E84;

pub const DIVIDER_DARK: u32 = 0xFF80_8080;
pub const DIVIDER_LIGHT: u32 = 0xFFF0_F0F0;

pub const SCROLL_INDICATOR_WIDTH: i32 = 6;
pub const SCROLL_INDICATOR_ARC_WIDTH: i32 = 2;
pub const SCROLL_INDICATOR_START_COLOR: u32 = 0xB0B4_B4B4;
pub const SCROLL_INDICATOR_END_COLOR: u32 = 0xB082_8282;
pub const SCROLL_INDICATOR_BORDER_COLOR: u32 = 0xB05A_5A5A;

pub const ITEM_GAP_SIZE: i32 = 10;

pub const LIST_ITEM_PADDING: i32 = 3;
pub const LIST_DIVIDER_HEIGHT: i32 = 1;
pub const LIST_ITEM_ODD_BGCOLOR_START: u32 = 0x80E0_E6ED;
pub const LIST_ITEM_ODD_BGCOLOR_END: u32 = 0x805E_7CA2;
pub const LIST_ITEM_EVEN_BGCOLOR_START: u32 = 0x80CF_E7D3;
pub const LIST_ITEM_EVEN_BGCOLOR_END: u32 = 0x8046_8C53;
pub const LIST_ITEM_SELECTED_BGCOLOR_START: u32 = 0x80FF_EEDD;
pub const LIST_ITEM_SELECTED_BGCOLOR_END: u32 = 0x80FF_C891;

/// Background images are dropped wholesale once the cache holds this many.
const BACKGROUND_CACHE_LIMIT: usize = 64;

#[derive(Clone, Debug)]
pub struct ThemeFonts {
    pub title: Arc<dyn Font>,
    pub sub_title: Arc<dyn Font>,
    pub default: Arc<dyn Font>,
    pub list_title: Arc<dyn Font>,
    pub list_summary: Arc<dyn Font>,
    pub number: Arc<dyn Font>,
}

impl ThemeFonts {
    /// Every role uses the same face.
    pub fn uniform(font: Arc<dyn Font>) -> Self {
        Self {
            title: font.clone(),
            sub_title: font.clone(),
            default: font.clone(),
            list_title: font.clone(),
            list_summary: font.clone(),
            number: font,
        }
    }
}

/// Bundled images. A resource that fails to load stays `None` and the
/// widgets using it draw without it.
#[derive(Clone, Debug, Default)]
pub struct ThemeImages {
    pub app_icon: Option<Image>,
    pub transparent_app_icon: Option<Image>,
    pub dialog_background: Option<Image>,
    pub soft_icon: Option<Image>,
    pub icon_bg_selected: Option<Image>,
    pub button_normal: Option<Image>,
    pub button_selected: Option<Image>,
    pub menu_refresh: Option<Image>,
    pub menu_install: Option<Image>,
    pub menu_back: Option<Image>,
    pub menu_exit: Option<Image>,
}

impl ThemeImages {
    /// Decodes every resource through `loader`, which maps a resource path
    /// such as `/app_icon.png` to its bytes.
    pub fn load(loader: impl Fn(&str) -> Option<Vec<u8>>) -> Self {
        let get = |path: &str| -> Option<Image> {
            let Some(bytes) = loader(path) else {
                log::error!("theme: missing resource {path}");
                return None;
            };
            match Image::decode(&bytes) {
                Ok(img) => Some(img),
                Err(e) => {
                    log::error!("theme: unable to load {path}: {e}");
                    None
                }
            }
        };
        Self {
            app_icon: get("/app_icon.png"),
            transparent_app_icon: get("/transparent_app_icon.png"),
            dialog_background: get("/dialog_bg.png"),
            soft_icon: get("/soft_icon.png"),
            icon_bg_selected: get("/icon_bg_selected.png"),
            button_normal: get("/button_bg_normal.png"),
            button_selected: get("/button_bg_selected.png"),
            menu_refresh: get("/menu_refresh.png"),
            menu_install: get("/menu_install.png"),
            menu_back: get("/menu_back.png"),
            menu_exit: get("/menu_exit.png"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ThemeEffects {
    pub title: Arc<Effect>,
    pub sub_title: Arc<Effect>,
    pub default: Arc<Effect>,
    pub button: Arc<Effect>,
    pub list_title: Arc<Effect>,
    pub list_summary: Arc<Effect>,
    pub number: Arc<Effect>,
    pub number_label: Arc<Effect>,
    pub dialog: Arc<Effect>,
}

impl ThemeEffects {
    fn new(fonts: &ThemeFonts) -> Self {
        let plain = |font: &Arc<dyn Font>, color| Arc::new(Effect::plain(font.clone(), color));
        Self {
            title: Arc::new(Effect::drop_shadow(fonts.title.clone(), WHITE, SHADOW_COLOR)),
            sub_title: plain(&fonts.sub_title, BLACK),
            default: plain(&fonts.default, BLACK),
            button: plain(&fonts.default, APPINFO_BUTTON_FGCOLOR),
            list_title: plain(&fonts.list_title, BLACK),
            list_summary: plain(&fonts.list_summary, BLACK),
            number: plain(&fonts.number, RED),
            number_label: plain(&fonts.number, BLACK),
            dialog: plain(&fonts.default, WHITE),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Generated {
    TitleBar,
    ListEven,
    ListOdd,
    ListSelected,
    BorderShadow,
}

pub struct ThemeConfig {
    pub fonts: ThemeFonts,
    pub images: ThemeImages,
    pub effects: ThemeEffects,
    backgrounds: Mutex<HashMap<(Generated, i32, i32), Image, ahash::RandomState>>,
}

impl std::fmt::Debug for ThemeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeConfig")
            .field("fonts", &self.fonts)
            .field("images", &self.images)
            .finish_non_exhaustive()
    }
}

impl ThemeConfig {
    pub fn new(fonts: ThemeFonts, images: ThemeImages) -> Self {
        let effects = ThemeEffects::new(&fonts);
        Self {
            fonts,
            images,
            effects,
            backgrounds: Mutex::new(HashMap::default()),
        }
    }

    /// One and a half times the taller of the title font and the app icon.
    pub fn title_bar_height(&self) -> i32 {
        let icon_h = self.images.app_icon.as_ref().map_or(0, |i| i.size().1);
        self.fonts.title.height().max(icon_h) * 3 / 2
    }

    pub fn title_bar_background(&self, width: i32) -> Option<Image> {
        let height = self.title_bar_height();
        self.generated(Generated::TitleBar, width, height, || {
            gradient_round_rect(
                width,
                height,
                TITLEBAR_BG_START_COLOR,
                TITLEBAR_BG_END_COLOR,
                TITLEBAR_BG_BORDER_COLOR,
                0,
                GradientDirection::Vertical,
            )
        })
    }

    /// Even rows (index 0, 2, ...) are green, odd rows blue.
    pub fn list_item_background(&self, index: usize, width: i32, height: i32) -> Option<Image> {
        let (kind, start, end) = if index % 2 == 0 {
            (Generated::ListEven, LIST_ITEM_EVEN_BGCOLOR_START, LIST_ITEM_EVEN_BGCOLOR_END)
        } else {
            (Generated::ListOdd, LIST_ITEM_ODD_BGCOLOR_START, LIST_ITEM_ODD_BGCOLOR_END)
        };
        self.generated(kind, width, height, || vertical_gradient(width, height, start, end))
    }

    pub fn list_item_selected_background(&self, width: i32, height: i32) -> Option<Image> {
        self.generated(Generated::ListSelected, width, height, || {
            vertical_gradient(
                width,
                height,
                LIST_ITEM_SELECTED_BGCOLOR_START,
                LIST_ITEM_SELECTED_BGCOLOR_END,
            )
        })
    }

    /// Soft shadow strip drawn under a title bar.
    pub fn border_shadow(&self, width: i32) -> Option<Image> {
        let height = BORDER_SHADOW_WIDTH;
        self.generated(Generated::BorderShadow, width, height, || {
            vertical_gradient(width, height, SHADOW_START_COLOR, SHADOW_END_COLOR)
        })
    }

    fn generated(
        &self,
        kind: Generated,
        width: i32,
        height: i32,
        build: impl FnOnce() -> Vec<u32>,
    ) -> Option<Image> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let mut cache = self.backgrounds.lock();
        if let Some(img) = cache.get(&(kind, width, height)) {
            return Some(img.clone());
        }
        let img = match Image::from_argb(width as u32, height as u32, build()) {
            Ok(img) => img,
            Err(e) => {
                log::error!("theme: bad {kind:?} background: {e}");
                return None;
            }
        };
        if cache.len() >= BACKGROUND_CACHE_LIMIT {
            cache.clear();
        }
        cache.insert((kind, width, height), img.clone());
        Some(img)
    }
}

/// ARGB pixels of the scroll indicator thumb.
pub fn scroll_indicator_pixels(width: i32, height: i32) -> Vec<u32> {
    gradient_round_rect(
        width,
        height,
        SCROLL_INDICATOR_START_COLOR,
        SCROLL_INDICATOR_END_COLOR,
        SCROLL_INDICATOR_BORDER_COLOR,
        SCROLL_INDICATOR_ARC_WIDTH,
        GradientDirection::Horizontal,
    )
}

fn vertical_gradient(width: i32, height: i32, start: u32, end: u32) -> Vec<u32> {
    gradient_round_rect(width, height, start, end, TRANSPARENT, 0, GradientDirection::Vertical)
}

#[cfg(test)]
pub(crate) fn test_theme() -> Arc<ThemeConfig> {
    let font: Arc<dyn Font> = Arc::new(rice_text::BlockFont::new(10, 12));
    Arc::new(ThemeConfig::new(ThemeFonts::uniform(font), ThemeImages::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_bar_height_without_icon() {
        let theme = test_theme();
        assert_eq!(theme.title_bar_height(), 18);
    }

    #[test]
    fn test_list_backgrounds_alternate_and_cache() {
        let theme = test_theme();
        let even = theme.list_item_background(0, 20, 10).unwrap();
        let odd = theme.list_item_background(1, 20, 10).unwrap();
        assert_eq!(even.pixel(0, 0), Some(LIST_ITEM_EVEN_BGCOLOR_START));
        assert_eq!(odd.pixel(0, 9), Some(LIST_ITEM_ODD_BGCOLOR_END));
        assert!(theme.list_item_background(2, 20, 10).unwrap().ptr_eq(&even));
        assert!(!theme.list_item_background(2, 20, 11).unwrap().ptr_eq(&even));
    }

    #[test]
    fn test_degenerate_background_is_none() {
        let theme = test_theme();
        assert!(theme.list_item_selected_background(0, 10).is_none());
        assert!(theme.border_shadow(-1).is_none());
    }

    #[test]
    fn test_load_missing_resources() {
        let images = ThemeImages::load(|path| (path == "/soft_icon.png").then(|| b"nope".to_vec()));
        assert!(images.app_icon.is_none());
        assert!(images.soft_icon.is_none());
    }

    #[test]
    fn test_title_effect_has_shadow() {
        let theme = test_theme();
        assert_eq!(theme.effects.title.max_padding(), (6, 6));
        assert_eq!(theme.effects.default.max_padding(), (0, 0));
    }
}
