//! 圆环倒计时显示
//!
//! 根据 (总时长, 剩余时长) 绘制进度圆环和居中的 MM:SS 文本，自身只保存直径

use std::f32::consts::{FRAC_PI_2, TAU};

use iced::alignment;
use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path};
use iced::{Point, Rectangle, Renderer};

use crate::ui::theme::Theme;

/// 外圈距离画布边缘的距离
const OUTER_MARGIN: f32 = 10.0;
/// 内圈挖空距离画布边缘的距离，决定圆环粗细
const INNER_MARGIN: f32 = 30.0;
/// 整圆弧线的分段数
const ARC_SEGMENTS: usize = 120;

/// 计算扫过的比例，范围 [0, 1]
///
/// # 参数
///
/// * `total` - 总秒数
/// * `remaining` - 剩余秒数
pub fn sweep_fraction(total: i64, remaining: i64) -> f32 {
    if total <= 0 {
        return 0.0;
    }
    (remaining as f32 / total as f32).clamp(0.0, 1.0)
}

/// 将剩余秒数格式化为 MM:SS
pub fn format_clock(remaining: i64) -> String {
    let remaining = remaining.max(0);
    format!("{:02}:{:02}", remaining / 60, remaining % 60)
}

/// 计算扇形轮廓上的点
///
/// 从12点方向开始顺时针扫过 `fraction` 圈，不包含圆心
pub fn pie_outline(center: Point, radius: f32, fraction: f32) -> Vec<Point> {
    let fraction = fraction.clamp(0.0, 1.0);
    let segments = ((ARC_SEGMENTS as f32 * fraction).ceil() as usize).max(1);
    let sweep = TAU * fraction;

    (0..=segments)
        .map(|i| {
            // 屏幕坐标y轴向下，角度增大即为顺时针
            let angle = -FRAC_PI_2 + sweep * (i as f32 / segments as f32);
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// 圆环倒计时组件
#[derive(Debug, Clone)]
pub struct RingDisplay {
    /// 直径
    diameter: f32,
    total: i64,
    remaining: i64,
    theme: Theme,
}

impl RingDisplay {
    /// 创建圆环显示
    ///
    /// # 参数
    ///
    /// * `diameter` - 直径
    /// * `total` - 总秒数
    /// * `remaining` - 剩余秒数
    /// * `theme` - 配色
    pub fn new(diameter: f32, total: i64, remaining: i64, theme: Theme) -> Self {
        Self {
            diameter,
            total,
            remaining,
            theme,
        }
    }

    /// 当前扫过的比例
    pub fn fraction(&self) -> f32 {
        sweep_fraction(self.total, self.remaining)
    }

    /// 当前显示的文本
    pub fn label(&self) -> String {
        format_clock(self.remaining)
    }
}

impl<Message> canvas::Program<Message> for RingDisplay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let center = frame.center();
        let half = self.diameter.min(bounds.width).min(bounds.height) / 2.0;
        let outer_radius = (half - OUTER_MARGIN).max(0.0);
        let inner_radius = (half - INNER_MARGIN).max(0.0);

        // 1. 圆环底色
        frame.fill(&Path::circle(center, outer_radius), self.theme.ring_track_color());

        // 2. 剩余时间扇形
        let fraction = self.fraction();
        if fraction > 0.0 {
            let outline = pie_outline(center, outer_radius, fraction);
            let pie = Path::new(|builder| {
                builder.move_to(center);
                for point in &outline {
                    builder.line_to(*point);
                }
                builder.close();
            });
            frame.fill(&pie, self.theme.accent_color());
        }

        // 3. 中心挖空形成圆环
        frame.fill(&Path::circle(center, inner_radius), self.theme.ring_hole_color());

        // 4. 时间文本
        frame.fill_text(canvas::Text {
            content: self.label(),
            position: center,
            color: self.theme.text_color(),
            size: self.theme.fonts.clock_size.into(),
            horizontal_alignment: alignment::Horizontal::Center,
            vertical_alignment: alignment::Vertical::Center,
            ..canvas::Text::default()
        });

        vec![frame.into_geometry()]
    }
}
