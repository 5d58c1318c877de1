//! UI管理器模块
//!
//! 使用iced实现调度窗口，把用户输入接到倒计时引擎和延迟执行器上

use iced::alignment::Horizontal;
use iced::widget::{button, canvas, column, container, mouse_area, radio, row, text, text_input, Space};
use iced::{executor, window, Alignment, Application, Command, Element, Length, Settings, Size, Subscription};
use log::{debug, error, info};

use crate::core::power::{PowerBackend, SystemPowerBackend};
use crate::core::runner::DeferredActionRunner;
use crate::core::settings::SettingsStore;
use crate::core::types::{ActionOutcome, CountdownUpdate, PowerAction, ScheduleId, ScheduleRequest};
use crate::core::countdown::TICK_INTERVAL;
use crate::core::CountdownEngine;
use crate::ui::ring::RingDisplay;
use crate::ui::theme::{ButtonKind, Theme, TransparentWindow};
use crate::utils::AppConfig;

/// 窗口尺寸
const WINDOW_SIZE: Size = Size::new(370.0, 440.0);

const INVALID_INPUT_TEXT: &str = "Please enter a valid number of seconds.";

/// 应用程序消息类型
#[derive(Debug, Clone)]
pub enum Message {
    /// 秒数输入改变
    DurationChanged(String),
    /// 选择电源操作
    ActionSelected(PowerAction),
    /// 开始调度
    Schedule,
    /// 取消调度
    Cancel,
    /// 周期性tick
    Tick,
    /// 后台执行器结束
    ActionSettled {
        id: ScheduleId,
        action: PowerAction,
        outcome: ActionOutcome,
    },
    /// 关闭提示横幅
    DismissNotice,
    /// 拖动窗口
    DragWindow,
    /// 关闭窗口
    CloseWindow,
}

/// 提示横幅
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// 启动窗口所需的协作者
pub struct UIFlags<B> {
    /// 应用配置
    pub config: AppConfig,
    /// 设置存储
    pub settings_store: SettingsStore,
    /// 延迟执行器
    pub runner: DeferredActionRunner<B>,
}

/// 调度窗口状态
pub struct UIManager<B> {
    /// 秒数输入
    duration_input: String,
    /// 选中的电源操作
    selected_action: PowerAction,
    /// 倒计时引擎
    engine: CountdownEngine,
    /// 圆环显示的 (总时长, 剩余时长)
    display: (i64, i64),
    /// 状态文本
    status_text: String,
    /// 提示横幅
    notice: Option<Notice>,
    settings_store: SettingsStore,
    runner: DeferredActionRunner<B>,
    config: AppConfig,
    theme: Theme,
}

impl<B: PowerBackend> UIManager<B> {
    /// 创建窗口状态，并用上次保存的设置预填输入
    pub fn with_flags(flags: UIFlags<B>) -> Self {
        let UIFlags {
            config,
            settings_store,
            runner,
        } = flags;

        let saved = settings_store.load();
        info!("预填上次的设置: {:?}", saved);

        Self {
            duration_input: saved.last_duration.map(|d| d.to_string()).unwrap_or_default(),
            selected_action: saved.last_action,
            engine: CountdownEngine::new(),
            display: (0, 0),
            status_text: String::new(),
            notice: None,
            settings_store,
            runner,
            config,
            theme: Theme::default(),
        }
    }

    /// 是否允许修改输入
    pub fn inputs_enabled(&self) -> bool {
        !self.engine.is_ticking()
    }

    /// 处理调度请求
    fn schedule(&mut self) -> Command<Message> {
        if self.engine.is_ticking() {
            debug!("已有进行中的倒计时，忽略调度请求");
            return Command::none();
        }

        let request = match ScheduleRequest::parse(&self.duration_input, self.selected_action) {
            Ok(request) => request,
            Err(e) => {
                info!("输入无效: {}", e);
                self.show_notice(INVALID_INPUT_TEXT, true);
                return Command::none();
            }
        };

        let update = match self.engine.start(request.duration_seconds() as i64) {
            Ok(update) => update,
            Err(e) => {
                error!("启动倒计时失败: {}", e);
                self.show_notice(INVALID_INPUT_TEXT, true);
                return Command::none();
            }
        };

        self.settings_store.save(request.duration_seconds(), request.action());
        self.notice = None;
        self.status_text = format!(
            "Scheduled {} in {} seconds...",
            request.action(),
            request.duration_seconds()
        );
        self.apply_update(update);

        let Some(id) = self.engine.schedule_id() else {
            return Command::none();
        };
        let action = request.action();
        Command::perform(
            self.runner.run(id, request, self.engine.cancel_flag()),
            move |outcome| Message::ActionSettled { id, action, outcome },
        )
    }

    /// 应用倒计时更新到显示
    fn apply_update(&mut self, update: CountdownUpdate) {
        self.display = update.display();
        if update.is_terminal() {
            debug!("倒计时进入终止状态: {:?}", update);
        }
        match update {
            CountdownUpdate::Progress { .. } => {}
            CountdownUpdate::Expired { .. } => {
                self.status_text = "Action executed.".to_string();
            }
            CountdownUpdate::Cancelled => {
                self.status_text = "Action cancelled.".to_string();
            }
        }
    }

    /// 处理后台执行器的结果
    fn settle(&mut self, id: ScheduleId, action: PowerAction, outcome: ActionOutcome) {
        if self.engine.schedule_id() != Some(id) {
            debug!("收到过期调度 {} 的结果: {:?}", id, outcome);
        } else if !self.engine.is_ticking() {
            // 当前调度已结束，释放标识
            self.engine.reset();
        }

        match outcome {
            ActionOutcome::Skipped => debug!("调度 {} 已跳过", id),
            ActionOutcome::Executed => info!("调度 {} 的 {} 已执行", id, action),
            ActionOutcome::Unsupported => {
                self.show_notice(&format!("This platform does not support {}.", action), false);
            }
            ActionOutcome::Failed(reason) => error!("调度 {} 的 {} 执行失败: {}", id, action, reason),
        }
    }

    fn show_notice(&mut self, text: &str, is_error: bool) {
        self.notice = Some(Notice {
            text: text.to_string(),
            is_error,
        });
    }

    fn handle(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::DurationChanged(input) => {
                if self.inputs_enabled() {
                    self.duration_input = input;
                }
                Command::none()
            }
            Message::ActionSelected(action) => {
                if self.inputs_enabled() {
                    self.selected_action = action;
                }
                Command::none()
            }
            Message::Schedule => self.schedule(),
            Message::Cancel => {
                if let Some(update) = self.engine.cancel() {
                    self.apply_update(update);
                }
                Command::none()
            }
            Message::Tick => {
                if let Some(update) = self.engine.tick() {
                    self.apply_update(update);
                }
                Command::none()
            }
            Message::ActionSettled { id, action, outcome } => {
                self.settle(id, action, outcome);
                Command::none()
            }
            Message::DismissNotice => {
                self.notice = None;
                Command::none()
            }
            Message::DragWindow => window::drag(window::Id::MAIN),
            Message::CloseWindow => {
                info!("用户关闭窗口");
                window::close(window::Id::MAIN)
            }
        }
    }

    fn build_input_panel(&self) -> Element<'_, Message> {
        let theme = &self.theme;
        let enabled = self.inputs_enabled();

        let mut entry = text_input("Seconds", &self.duration_input)
            .padding(8)
            .size(theme.fonts.input_size)
            .style(theme.input_style());
        if enabled {
            entry = entry.on_input(Message::DurationChanged).on_submit(Message::Schedule);
        }

        let radios = PowerAction::ALL.into_iter().fold(row![].spacing(24), |radios, action| {
            radios.push(
                radio(action.as_str(), action, Some(self.selected_action), Message::ActionSelected)
                    .size(16)
                    .text_size(13)
                    .style(theme.radio_style()),
            )
        });

        column![
            text("Enter time in seconds:").size(theme.fonts.default_size),
            entry,
            radios,
        ]
        .spacing(12)
        .into()
    }

    fn build_control_button(&self) -> Element<'_, Message> {
        let theme = &self.theme;
        let (label, kind, message) = if self.engine.is_ticking() {
            ("Cancel", ButtonKind::Danger, Message::Cancel)
        } else {
            ("Schedule", ButtonKind::Primary, Message::Schedule)
        };

        button(
            text(label)
                .size(theme.fonts.button_size)
                .horizontal_alignment(Horizontal::Center),
        )
        .on_press(message)
        .width(Length::Fill)
        .padding([8, 0])
        .style(theme.button_style(kind))
        .into()
    }

    fn build_notice(&self, notice: &Notice) -> Element<'_, Message> {
        let palette = self.theme.clone();
        let is_error = notice.is_error;

        container(
            row![
                text(&notice.text).size(self.theme.fonts.status_size).width(Length::Fill),
                button(text("×").size(12))
                    .on_press(Message::DismissNotice)
                    .padding([0, 6])
                    .style(self.theme.button_style(ButtonKind::Close)),
            ]
            .spacing(8)
            .align_items(Alignment::Center),
        )
        .padding(8)
        .width(Length::Fill)
        .style(move |_theme: &iced::Theme| palette.notice_appearance(is_error))
        .into()
    }
}

/// 运行UI应用程序
///
/// # 参数
///
/// * `flags` - 窗口所需的协作者
pub fn run_with_params(flags: UIFlags<SystemPowerBackend>) -> iced::Result {
    let settings = Settings {
        window: window::Settings {
            size: WINDOW_SIZE,
            resizable: false,
            decorations: false,
            transparent: true,
            ..window::Settings::default()
        },
        antialiasing: true,
        ..Settings::with_flags(flags)
    };
    UIManager::run(settings)
}

impl<B: PowerBackend> Application for UIManager<B> {
    type Message = Message;
    type Theme = iced::Theme;
    type Executor = executor::Default;
    type Flags = UIFlags<B>;

    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>) {
        (Self::with_flags(flags), Command::none())
    }

    fn title(&self) -> String {
        "Sleep/Hibernate Scheduler".to_string()
    }

    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        self.handle(message)
    }

    /// 只在倒计时进行中产生tick
    fn subscription(&self) -> Subscription<Self::Message> {
        if self.engine.is_ticking() {
            iced::time::every(TICK_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<'_, Self::Message> {
        let theme = &self.theme;
        let diameter = self.config.ring_diameter;
        let (total, remaining) = self.display;

        let close_button = button(text("×").size(14).horizontal_alignment(Horizontal::Center))
            .on_press(Message::CloseWindow)
            .width(Length::Fixed(20.0))
            .height(Length::Fixed(20.0))
            .padding(0)
            .style(theme.button_style(ButtonKind::Close));

        let ring = canvas(RingDisplay::new(diameter, total, remaining, theme.clone()))
            .width(Length::Fixed(diameter))
            .height(Length::Fixed(diameter));

        let mut content = column![
            row![Space::with_width(Length::Fill), close_button],
            self.build_input_panel(),
            self.build_control_button(),
            container(ring).width(Length::Fill).center_x(),
            text(&self.status_text)
                .size(theme.fonts.status_size)
                .style(theme.secondary_text_color()),
        ]
        .spacing(12);

        if let Some(notice) = &self.notice {
            content = content.push(self.build_notice(notice));
        }

        let palette = theme.clone();
        let panel = container(content)
            .padding([8, 24, 24, 24])
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme: &iced::Theme| palette.panel_appearance());

        mouse_area(container(panel).padding(10))
            .on_press(Message::DragWindow)
            .into()
    }

    fn theme(&self) -> Self::Theme {
        iced::Theme::Dark
    }

    fn style(&self) -> iced::theme::Application {
        TransparentWindow::style(&self.theme)
    }
}
