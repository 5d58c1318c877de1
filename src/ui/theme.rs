//! UI主题模块
//!
//! 定义玻璃风格界面的颜色、字体和圆角

use iced::widget::{button, container, radio, text_input};
use iced::{Background, Border, Color, Shadow};

/// 应用主题
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// 颜色配置
    pub colors: ThemeColors,
    /// 字体配置
    pub fonts: ThemeFonts,
    /// 圆角配置
    pub rounding: ThemeRounding,
}

/// 主题颜色配置
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    /// 玻璃面板背景（含透明度）
    pub glass: [u8; 4],
    /// 圆环中心的挖空颜色
    pub ring_hole: [u8; 3],
    /// 圆环底色
    pub ring_track: [u8; 3],
    /// 进度和主按钮颜色
    pub accent: [u8; 3],
    /// 主按钮按下颜色
    pub accent_pressed: [u8; 3],
    /// 输入框背景
    pub input: [u8; 3],
    /// 主要文本色
    pub text: [u8; 3],
    /// 状态文本色
    pub text_secondary: [u8; 3],
    /// 取消和关闭按钮颜色
    pub danger: [u8; 3],
    /// 取消按钮按下颜色
    pub danger_pressed: [u8; 3],
}

/// 字体配置
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeFonts {
    pub default_size: f32,
    pub input_size: f32,
    pub button_size: f32,
    pub status_size: f32,
    pub clock_size: f32,
}

/// 圆角配置
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeRounding {
    /// 面板圆角
    pub panel: f32,
    /// 按钮和输入框圆角
    pub control: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::glass_theme()
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgb8(r, g, b)
}

impl Theme {
    /// 创建深色玻璃主题
    pub fn glass_theme() -> Self {
        Self {
            colors: ThemeColors {
                glass: [34, 34, 34, 180],
                ring_hole: [34, 34, 34],
                ring_track: [60, 60, 60],
                accent: [0, 234, 255],
                accent_pressed: [0, 188, 212],
                input: [51, 51, 51],
                text: [255, 255, 255],
                text_secondary: [170, 170, 170],
                danger: [255, 95, 87],
                danger_pressed: [217, 76, 68],
            },
            fonts: ThemeFonts {
                default_size: 14.0,
                input_size: 18.0,
                button_size: 16.0,
                status_size: 12.0,
                clock_size: 32.0,
            },
            rounding: ThemeRounding {
                panel: 18.0,
                control: 8.0,
            },
        }
    }

    /// 玻璃面板背景颜色
    pub fn glass_color(&self) -> Color {
        let [r, g, b, a] = self.colors.glass;
        Color::from_rgba8(r, g, b, a as f32 / 255.0)
    }

    pub fn ring_track_color(&self) -> Color {
        rgb(self.colors.ring_track)
    }

    pub fn ring_hole_color(&self) -> Color {
        rgb(self.colors.ring_hole)
    }

    pub fn accent_color(&self) -> Color {
        rgb(self.colors.accent)
    }

    pub fn text_color(&self) -> Color {
        rgb(self.colors.text)
    }

    pub fn secondary_text_color(&self) -> Color {
        rgb(self.colors.text_secondary)
    }

    pub fn danger_color(&self) -> Color {
        rgb(self.colors.danger)
    }

    /// 玻璃面板样式
    pub fn panel_appearance(&self) -> container::Appearance {
        container::Appearance {
            background: Some(Background::Color(self.glass_color())),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: self.rounding.panel.into(),
            },
            shadow: Shadow::default(),
            text_color: Some(self.text_color()),
        }
    }

    /// 提示横幅样式
    ///
    /// # 参数
    ///
    /// * `is_error` - 是否为错误提示
    pub fn notice_appearance(&self, is_error: bool) -> container::Appearance {
        let tint = if is_error { self.danger_color() } else { self.accent_color() };
        container::Appearance {
            background: Some(Background::Color(Color { a: 0.2, ..tint })),
            border: Border {
                color: tint,
                width: 1.0,
                radius: self.rounding.control.into(),
            },
            shadow: Shadow::default(),
            text_color: Some(self.text_color()),
        }
    }

    /// 按钮样式
    ///
    /// # 参数
    ///
    /// * `kind` - 按钮种类
    /// * `pressed` - 是否处于按下状态
    pub fn button_appearance(&self, kind: ButtonKind, pressed: bool) -> button::Appearance {
        let (background, text_color, radius) = match (kind, pressed) {
            (ButtonKind::Primary, false) => (self.accent_color(), self.ring_hole_color(), self.rounding.control),
            (ButtonKind::Primary, true) => (rgb(self.colors.accent_pressed), self.text_color(), self.rounding.control),
            (ButtonKind::Danger, false) => (self.danger_color(), self.text_color(), self.rounding.control),
            (ButtonKind::Danger, true) => (rgb(self.colors.danger_pressed), self.text_color(), self.rounding.control),
            (ButtonKind::Close, false) => (self.danger_color(), Color::from_rgb8(191, 0, 0), 10.0),
            (ButtonKind::Close, true) => (rgb(self.colors.danger_pressed), Color::from_rgb8(191, 0, 0), 10.0),
        };

        button::Appearance {
            background: Some(Background::Color(background)),
            text_color,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: radius.into(),
            },
            ..button::Appearance::default()
        }
    }

    /// 输入框样式
    pub fn input_appearance(&self) -> text_input::Appearance {
        text_input::Appearance {
            background: Background::Color(rgb(self.colors.input)),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: self.rounding.control.into(),
            },
            icon_color: self.secondary_text_color(),
        }
    }

    /// 单选框样式
    pub fn radio_appearance(&self, selected: bool) -> radio::Appearance {
        radio::Appearance {
            background: Background::Color(rgb(self.colors.input)),
            dot_color: self.accent_color(),
            border_width: 1.0,
            border_color: if selected { self.accent_color() } else { self.secondary_text_color() },
            text_color: Some(self.text_color()),
        }
    }
}

/// 按钮种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// 调度按钮
    Primary,
    /// 取消按钮
    Danger,
    /// 窗口关闭按钮
    Close,
}

impl Theme {
    /// 包装为iced按钮样式
    pub fn button_style(&self, kind: ButtonKind) -> iced::theme::Button {
        iced::theme::Button::Custom(Box::new(ButtonStyle {
            palette: self.clone(),
            kind,
        }))
    }

    /// 包装为iced输入框样式
    pub fn input_style(&self) -> iced::theme::TextInput {
        iced::theme::TextInput::Custom(Box::new(InputStyle {
            palette: self.clone(),
        }))
    }

    /// 包装为iced单选框样式
    pub fn radio_style(&self) -> iced::theme::Radio {
        iced::theme::Radio::Custom(Box::new(RadioStyle {
            palette: self.clone(),
        }))
    }
}

struct ButtonStyle {
    palette: Theme,
    kind: ButtonKind,
}

impl button::StyleSheet for ButtonStyle {
    type Style = iced::Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        self.palette.button_appearance(self.kind, false)
    }

    fn pressed(&self, _style: &Self::Style) -> button::Appearance {
        self.palette.button_appearance(self.kind, true)
    }
}

struct InputStyle {
    palette: Theme,
}

impl text_input::StyleSheet for InputStyle {
    type Style = iced::Theme;

    fn active(&self, _style: &Self::Style) -> text_input::Appearance {
        self.palette.input_appearance()
    }

    fn focused(&self, _style: &Self::Style) -> text_input::Appearance {
        self.palette.input_appearance()
    }

    fn placeholder_color(&self, _style: &Self::Style) -> Color {
        self.palette.secondary_text_color()
    }

    fn value_color(&self, _style: &Self::Style) -> Color {
        self.palette.text_color()
    }

    fn disabled_color(&self, _style: &Self::Style) -> Color {
        self.palette.secondary_text_color()
    }

    fn selection_color(&self, _style: &Self::Style) -> Color {
        Color { a: 0.4, ..self.palette.accent_color() }
    }

    fn disabled(&self, _style: &Self::Style) -> text_input::Appearance {
        self.palette.input_appearance()
    }
}

struct RadioStyle {
    palette: Theme,
}

impl radio::StyleSheet for RadioStyle {
    type Style = iced::Theme;

    fn active(&self, _style: &Self::Style, is_selected: bool) -> radio::Appearance {
        self.palette.radio_appearance(is_selected)
    }

    fn hovered(&self, _style: &Self::Style, is_selected: bool) -> radio::Appearance {
        self.palette.radio_appearance(is_selected)
    }
}

/// 透明窗口背景，由玻璃面板自行绘制底色
pub struct TransparentWindow {
    text_color: Color,
}

impl TransparentWindow {
    pub fn style(palette: &Theme) -> iced::theme::Application {
        iced::theme::Application::Custom(Box::new(Self {
            text_color: palette.text_color(),
        }))
    }
}

impl iced::application::StyleSheet for TransparentWindow {
    type Style = iced::Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::application::Appearance {
        iced::application::Appearance {
            background_color: Color::TRANSPARENT,
            text_color: self.text_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_creation() {
        let theme = Theme::default();
        assert_eq!(theme, Theme::glass_theme());
        assert_eq!(theme.fonts.clock_size, 32.0);
    }

    #[test]
    fn test_color_conversion() {
        let theme = Theme::glass_theme();

        assert_eq!(theme.accent_color(), Color::from_rgb8(0, 234, 255));
        assert_eq!(theme.glass_color().a, 180.0 / 255.0);
        assert_eq!(theme.ring_track_color().r, 60.0 / 255.0);
    }

    #[test]
    fn test_button_appearance_kinds() {
        let theme = Theme::glass_theme();

        let primary = theme.button_appearance(ButtonKind::Primary, false);
        assert_eq!(primary.background, Some(Background::Color(theme.accent_color())));

        let pressed = theme.button_appearance(ButtonKind::Danger, true);
        assert_eq!(pressed.background, Some(Background::Color(Color::from_rgb8(217, 76, 68))));
    }
}
