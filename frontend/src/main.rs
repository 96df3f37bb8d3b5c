mod api;
mod markdown;

use gloo_timers::callback::Timeout;
use shared::{GenerateForm, POLL_INTERVAL_MS, ProcessType, ReportStatus, ReportSubmission};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

// Progress phases
#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Submitting,
    Started,
    Polling,
    Completed,
    Failed,
}

impl Phase {
    fn progress_width(&self) -> &'static str {
        match self {
            Phase::Idle => "0%",
            Phase::Submitting => "10%",
            Phase::Started => "25%",
            Phase::Polling | Phase::Failed => "50%",
            Phase::Completed => "100%",
        }
    }

    fn progress_class(&self) -> &'static str {
        match self {
            Phase::Completed => "progress-bar bg-success",
            Phase::Failed => "progress-bar bg-danger",
            _ => "progress-bar",
        }
    }
}

// Yew msg components
enum Msg {
    // Form inputs
    TopicInput(String),
    TemperatureInput(String),
    ProcessTypeChange(String),

    // Generation lifecycle
    Generate,
    Submitted(Result<ReportSubmission, String>),
    PollTick,
    StatusFetched(Result<ReportStatus, String>),

    // Downloads
    DownloadText,
    DownloadPdf,
}

// Main component
struct App {
    topic: String,
    temperature: String,
    process_type: ProcessType,
    task_id: Option<String>,
    phase: Phase,
    status_text: String,
    report_html: Option<String>,
    poll_timer: Option<Timeout>,
    loading: bool,
}

// Yew component implementation
impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            topic: String::new(),
            temperature: "0.7".to_string(),
            process_type: ProcessType::Hierarchical,
            task_id: None,
            phase: Phase::Idle,
            status_text: String::new(),
            report_html: None,
            poll_timer: None,
            loading: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::TopicInput(value) => {
                self.topic = value;
                false
            }
            Msg::TemperatureInput(value) => {
                self.temperature = value;
                true
            }
            Msg::ProcessTypeChange(value) => {
                self.process_type = value.parse().unwrap_or_default();
                false
            }
            Msg::Generate => self.handle_generate(ctx),
            Msg::Submitted(result) => self.handle_submitted(ctx, result),
            Msg::PollTick => self.handle_poll_tick(ctx),
            Msg::StatusFetched(result) => self.handle_status_fetched(ctx, result),
            Msg::DownloadText => self.handle_download(api::download_url_text),
            Msg::DownloadPdf => self.handle_download(api::download_url_pdf),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { self.render_header() }

                <main class="main-content">
                    { self.render_form(ctx) }
                    { self.render_progress() }
                    { self.render_report(ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"Astronomy Intelligence Bot | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

// Handler methods
impl App {
    fn handle_generate(&mut self, ctx: &Context<Self>) -> bool {
        let topic = self.topic.trim().to_string();
        if topic.is_empty() {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message("Please enter an astronomy topic");
            }
            return false;
        }

        self.phase = Phase::Submitting;
        self.status_text = "Submitting request...".to_string();
        self.report_html = None;
        self.task_id = None;
        self.poll_timer = None;
        self.loading = true;

        let form = GenerateForm {
            topic,
            temperature: self.temperature.trim().parse().ok(),
            process_type: Some(self.process_type),
        };

        let link = ctx.link().clone();
        spawn_local(async move {
            link.send_message(Msg::Submitted(api::submit_report(&form).await));
        });

        true
    }

    fn handle_submitted(
        &mut self,
        ctx: &Context<Self>,
        result: Result<ReportSubmission, String>,
    ) -> bool {
        match result {
            Ok(submission) => {
                gloo_console::log!("Report task accepted:", submission.task_id.as_str());
                self.task_id = Some(submission.task_id);
                self.phase = Phase::Started;
                self.status_text =
                    "Report generation started. This may take a few minutes...".to_string();
                self.spawn_status_fetch(ctx);
                true
            }
            Err(message) => self.fail(format!("Error: {}", message)),
        }
    }

    fn handle_poll_tick(&mut self, ctx: &Context<Self>) -> bool {
        self.poll_timer = None;
        self.spawn_status_fetch(ctx);
        false
    }

    fn handle_status_fetched(
        &mut self,
        ctx: &Context<Self>,
        result: Result<ReportStatus, String>,
    ) -> bool {
        let report = match result {
            Ok(report) => report,
            Err(message) => return self.fail(format!("Error: {}", message)),
        };

        if report.is_processing() {
            self.phase = Phase::Polling;
            // Next poll is scheduled only once this response has arrived,
            // so no two polls are ever in flight at the same time.
            let link = ctx.link().clone();
            self.poll_timer = Some(Timeout::new(POLL_INTERVAL_MS, move || {
                link.send_message(Msg::PollTick);
            }));
            true
        } else if report.is_completed() {
            self.phase = Phase::Completed;
            self.status_text = "Report generation complete!".to_string();
            self.report_html = report
                .report_text
                .as_deref()
                .map(markdown::render_markdown);
            if let Some(topic) = report.topic {
                if topic != self.topic {
                    self.topic = topic;
                }
            }
            self.loading = false;
            true
        } else {
            let detail = report
                .report_text
                .unwrap_or_else(|| "report generation failed".to_string());
            self.fail(format!("Error: {}", detail))
        }
    }

    fn handle_download(&mut self, url_for: fn(&str) -> String) -> bool {
        if let Some(task_id) = &self.task_id {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.location().set_href(&url_for(task_id)) {
                    gloo_console::error!("Navigation failed:", e);
                }
            }
        }
        false
    }

    // Helper methods
    fn spawn_status_fetch(&self, ctx: &Context<Self>) {
        let Some(task_id) = self.task_id.clone() else {
            return;
        };
        let link = ctx.link().clone();
        spawn_local(async move {
            link.send_message(Msg::StatusFetched(api::fetch_report(&task_id).await));
        });
    }

    fn fail(&mut self, message: String) -> bool {
        gloo_console::error!(message.clone());
        self.status_text = message;
        self.phase = Phase::Failed;
        self.poll_timer = None;
        self.loading = false;
        true
    }
}

// Rendering methods
impl App {
    fn render_header(&self) -> Html {
        html! {
            <header class="app-header">
                <h1><i class="fa-solid fa-meteor"></i> {" Astronomy Intelligence Bot"}</h1>
                <p class="subtitle">{"Generate research reports on any astronomy topic"}</p>
            </header>
        }
    }

    fn render_form(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let on_topic = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::TopicInput(input.value())
        });

        let on_temperature = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::TemperatureInput(input.value())
        });

        let on_process_type = link.callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            Msg::ProcessTypeChange(select.value())
        });

        html! {
            <div class="form-card">
                <div class="form-group">
                    <label for="topic-input">{"Astronomy topic"}</label>
                    <input
                        id="topic-input"
                        type="text"
                        placeholder="e.g. Black Holes"
                        value={self.topic.clone()}
                        oninput={on_topic}
                    />
                </div>

                <div class="form-group">
                    <label for="temperature">
                        {"Temperature: "}
                        <span id="temp-value">{ &self.temperature }</span>
                    </label>
                    <input
                        id="temperature"
                        type="range"
                        min="0"
                        max="1"
                        step="0.1"
                        value={self.temperature.clone()}
                        oninput={on_temperature}
                    />
                </div>

                <div class="form-group">
                    <label for="process-type">{"Process type"}</label>
                    <select id="process-type" onchange={on_process_type}>
                        <option
                            value="hierarchical"
                            selected={self.process_type == ProcessType::Hierarchical}
                        >
                            {"Hierarchical"}
                        </option>
                        <option
                            value="sequential"
                            selected={self.process_type == ProcessType::Sequential}
                        >
                            {"Sequential"}
                        </option>
                    </select>
                </div>

                <button
                    id="generate-button"
                    class="generate-btn"
                    disabled={self.loading}
                    onclick={link.callback(|_| Msg::Generate)}
                >
                    {
                        if self.loading {
                            html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Generating..."}</> }
                        } else {
                            html! { <><i class="fa-solid fa-rocket"></i>{" Generate"}</> }
                        }
                    }
                </button>
            </div>
        }
    }

    fn render_progress(&self) -> Html {
        if self.phase == Phase::Idle {
            return html! {};
        }

        html! {
            <div class="progress-card">
                <div class="progress">
                    <div
                        class={self.phase.progress_class()}
                        style={format!("width: {}", self.phase.progress_width())}
                    ></div>
                </div>
                <p id="status-text">{ &self.status_text }</p>
            </div>
        }
    }

    fn render_report(&self, ctx: &Context<Self>) -> Html {
        let Some(report_html) = &self.report_html else {
            return html! {};
        };

        let link = ctx.link();
        let rendered = Html::from_html_unchecked(AttrValue::from(report_html.clone()));

        html! {
            <div class="report-card">
                <div class="report-content">{ rendered }</div>
                <div class="button-container">
                    <button
                        class="download-btn"
                        onclick={link.callback(|_| Msg::DownloadText)}
                    >
                        <i class="fa-solid fa-file-lines"></i>{" Download as Text"}
                    </button>
                    <button
                        class="download-btn"
                        onclick={link.callback(|_| Msg::DownloadPdf)}
                    >
                        <i class="fa-solid fa-file-pdf"></i>{" Download as PDF"}
                    </button>
                </div>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<App>::new().render();
}
