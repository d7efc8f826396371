use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path as CanvasPath, Stroke},
        column, container, pick_list, progress_bar, row, scrollable, text, text_input, Column,
        Container,
    },
    Alignment, Background, Border, Color, Element, Length, Point, Rectangle, Renderer,
    Subscription, Task, Theme,
};
use pcapcore::client::ApiClient;
use pcapcore::latency::LatencySeries;
use pcapcore::model::{
    capture_duration_severity, delay_category_title, distinct_destinations, distinct_protocols,
    distinct_sources, format_capture_duration, packet_count_severity, packet_rate_severity,
    packet_size_severity, page_slice, service_name, sort_by_percentage_desc, LengthTier,
    PacketFilter, PacketRecord, Severity,
};
use pcapcore::normalize;
use pcapcore::prelude::DataSource;
use pcapcore::sample::sample_response;
use pcapcore::session::{LoadedLatency, LoadedPackets, LoadedView, SessionLoader};
use pcapcore::store::{FileCacheStore, FileMetadataStore};
use pcapcore::telemetry::IngestMetrics;
use pcapcore::upload::{UploadState, Uploader};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const DATA_DIR: &str = "data";
const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
const PAGE_SIZE: usize = 15;
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const ALL_PROTOCOLS: &str = "All Protocols";
const ALL_SOURCES: &str = "All Sources";
const ALL_DESTINATIONS: &str = "All Destinations";

fn main() -> iced::Result {
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "PacketLens".into()
}

fn application_subscription(state: &Dashboard) -> Subscription<Message> {
    match state.upload_state {
        UploadState::Uploading { .. } | UploadState::Analyzing => {
            time::every(Duration::from_millis(200)).map(|_| Message::UploadTick)
        }
        _ => Subscription::none(),
    }
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Upload,
    Overview,
    Search,
    Visualization,
}

struct Dashboard {
    page: Page,
    api_base: String,
    capture_path: String,
    upload_state: UploadState,
    upload_progress: Option<watch::Receiver<UploadState>>,
    active_upload: Option<Arc<Uploader>>,
    overview: Option<LoadedView>,
    packets: Vec<PacketRecord>,
    packets_notice: Option<String>,
    filter: PacketFilter,
    current_page: usize,
    latency: Vec<LatencySeries>,
    latency_notice: Option<String>,
    status: String,
    fetch_generation: u64,
}

#[derive(Debug, Clone)]
enum Message {
    Navigate(Page),
    ApiBaseChanged(String),
    PathChanged(String),
    StartUpload,
    CancelUpload,
    UploadTick,
    UploadFinished(UploadState),
    OverviewLoaded(u64, LoadedView),
    PacketsLoaded(u64, LoadedPackets),
    LatencyLoaded(u64, LoadedLatency),
    QueryChanged(String),
    ProtocolSelected(String),
    SourceSelected(String),
    DestinationSelected(String),
    LengthSelected(LengthTier),
    ClearFilters,
    PrevPage,
    NextPage,
    SaveOverview,
    SaveFiltered,
    Refresh,
}

impl Dashboard {
    fn boot() -> (Self, Task<Message>) {
        let state = Dashboard {
            page: Page::Upload,
            api_base: DEFAULT_API_BASE.into(),
            capture_path: String::new(),
            upload_state: UploadState::Idle,
            upload_progress: None,
            active_upload: None,
            overview: None,
            packets: Vec::new(),
            packets_notice: None,
            filter: PacketFilter::default(),
            current_page: 1,
            latency: Vec::new(),
            latency_notice: None,
            status: "Select a .pcapng capture to begin".into(),
            fetch_generation: 0,
        };
        (state, Task::none())
    }

    fn reload_all(&mut self) -> Task<Message> {
        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        let base = self.api_base.clone();
        Task::batch([
            Task::perform(fetch_overview_view(base.clone(), generation), |(gen, view)| {
                Message::OverviewLoaded(gen, view)
            }),
            Task::perform(fetch_packet_view(base.clone(), generation), |(gen, loaded)| {
                Message::PacketsLoaded(gen, loaded)
            }),
            Task::perform(fetch_latency_view(base, generation), |(gen, loaded)| {
                Message::LatencyLoaded(gen, loaded)
            }),
        ])
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(page) => {
                state.page = page;
                let needs_data = match page {
                    Page::Overview => state.overview.is_none(),
                    Page::Search => state.packets.is_empty(),
                    Page::Visualization => state.latency.is_empty(),
                    Page::Upload => false,
                };
                if needs_data {
                    state.reload_all()
                } else {
                    Task::none()
                }
            }
            Message::Refresh => state.reload_all(),
            Message::ApiBaseChanged(value) => {
                state.api_base = value;
                Task::none()
            }
            Message::PathChanged(value) => {
                state.capture_path = value;
                Task::none()
            }
            Message::StartUpload => {
                let client = match ApiClient::new(state.api_base.clone(), UPLOAD_TIMEOUT) {
                    Ok(client) => client,
                    Err(err) => {
                        state.upload_state = UploadState::Failed {
                            message: err.to_string(),
                        };
                        return Task::none();
                    }
                };
                let mut uploader = Uploader::new(
                    client,
                    Arc::new(FileCacheStore::new(DATA_DIR)),
                    Arc::new(FileMetadataStore::new(
                        Path::new(DATA_DIR).join("analysis-metadata.json"),
                    )),
                );
                if let Err(err) = uploader.select_file(Path::new(&state.capture_path)) {
                    state.upload_state = UploadState::Failed {
                        message: err.to_string(),
                    };
                    return Task::none();
                }
                let uploader = Arc::new(uploader);
                state.upload_progress = Some(uploader.subscribe());
                state.active_upload = Some(uploader.clone());
                state.upload_state = UploadState::Uploading { percent: 0 };
                state.status = "Uploading capture...".into();
                Task::perform(
                    async move {
                        uploader.submit().await;
                        uploader.state()
                    },
                    Message::UploadFinished,
                )
            }
            Message::CancelUpload => {
                if let Some(uploader) = &state.active_upload {
                    uploader.cancel();
                    state.status = "Cancelling upload...".into();
                }
                Task::none()
            }
            Message::UploadTick => {
                if let Some(receiver) = &state.upload_progress {
                    state.upload_state = receiver.borrow().clone();
                }
                Task::none()
            }
            Message::UploadFinished(final_state) => {
                state.upload_progress = None;
                state.active_upload = None;
                let succeeded = matches!(final_state, UploadState::Succeeded { .. });
                state.upload_state = final_state;
                if succeeded {
                    state.status = "Analysis complete".into();
                    // Drop previously loaded pages so they re-read the fresh cache.
                    state.overview = None;
                    state.packets.clear();
                    state.latency.clear();
                    state.page = Page::Overview;
                    state.reload_all()
                } else {
                    Task::none()
                }
            }
            Message::OverviewLoaded(generation, view) => {
                if generation == state.fetch_generation {
                    state.status = match view.source {
                        DataSource::CachedUpload => "Overview loaded from cached upload".into(),
                        DataSource::LiveFetch => "Overview loaded from API".into(),
                        DataSource::Sample => "Overview showing sample data".into(),
                    };
                    state.overview = Some(view);
                }
                Task::none()
            }
            Message::PacketsLoaded(generation, loaded) => {
                if generation == state.fetch_generation {
                    state.packets = loaded.packets;
                    state.packets_notice = loaded.notice;
                    state.current_page = 1;
                }
                Task::none()
            }
            Message::LatencyLoaded(generation, loaded) => {
                if generation == state.fetch_generation {
                    state.latency = loaded.series;
                    state.latency_notice = loaded.notice;
                }
                Task::none()
            }
            Message::QueryChanged(value) => {
                state.filter.query = value;
                state.current_page = 1;
                Task::none()
            }
            Message::ProtocolSelected(value) => {
                state.filter.protocol = (value != ALL_PROTOCOLS).then_some(value);
                state.current_page = 1;
                Task::none()
            }
            Message::SourceSelected(value) => {
                state.filter.source = (value != ALL_SOURCES).then_some(value);
                state.current_page = 1;
                Task::none()
            }
            Message::DestinationSelected(value) => {
                state.filter.destination = (value != ALL_DESTINATIONS).then_some(value);
                state.current_page = 1;
                Task::none()
            }
            Message::LengthSelected(tier) => {
                state.filter.length = tier;
                state.current_page = 1;
                Task::none()
            }
            Message::ClearFilters => {
                state.filter = PacketFilter::default();
                state.current_page = 1;
                Task::none()
            }
            Message::PrevPage => {
                state.current_page = state.current_page.saturating_sub(1).max(1);
                Task::none()
            }
            Message::NextPage => {
                let total = state.filter.apply(&state.packets).len();
                let last = total.div_ceil(PAGE_SIZE).max(1);
                state.current_page = (state.current_page + 1).min(last);
                Task::none()
            }
            Message::SaveOverview => {
                if let Some(view) = &state.overview {
                    state.status = match serde_json::to_vec_pretty(&view.raw)
                        .map_err(|err| err.to_string())
                        .and_then(|bytes| {
                            std::fs::write("data.json", bytes).map_err(|err| err.to_string())
                        }) {
                        Ok(()) => "Saved analysis to data.json".into(),
                        Err(err) => format!("Save failed: {err}"),
                    };
                }
                Task::none()
            }
            Message::SaveFiltered => {
                let filtered = state.filter.apply(&state.packets);
                state.status = match serde_json::to_vec_pretty(&filtered)
                    .map_err(|err| err.to_string())
                    .and_then(|bytes| {
                        std::fs::write("packets.json", bytes).map_err(|err| err.to_string())
                    }) {
                    Ok(()) => format!("Saved {} packets to packets.json", filtered.len()),
                    Err(err) => format!("Save failed: {err}"),
                };
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let nav = row![
            nav_button("Upload", Page::Upload, state.page),
            nav_button("Overview", Page::Overview, state.page),
            nav_button("Search", Page::Search, state.page),
            nav_button("Visualization", Page::Visualization, state.page),
            button("Refresh").on_press(Message::Refresh).padding(8),
        ]
        .spacing(8)
        .padding(8);

        let body: Element<'_, Message> = match state.page {
            Page::Upload => state.view_upload(),
            Page::Overview => state.view_overview(),
            Page::Search => state.view_search(),
            Page::Visualization => state.view_visualization(),
        };

        let layout = column![
            nav,
            text(&state.status).size(13),
            scrollable(Container::new(body).padding(16)).height(Length::Fill),
        ]
        .spacing(8)
        .padding(8);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_upload(&self) -> Element<'_, Message> {
        let progress_line = match &self.upload_state {
            UploadState::Idle => text("No capture selected").size(14),
            UploadState::FileSelected { file_name } => {
                text(format!("Ready to upload {file_name}")).size(14)
            }
            UploadState::Uploading { percent } => {
                text(format!("Uploading... {percent}%")).size(14)
            }
            UploadState::Analyzing => text("Analyzing capture...").size(14),
            UploadState::Succeeded { file_name } => {
                text(format!("Analyzed {file_name}")).size(14).color(GREEN)
            }
            UploadState::Failed { message } => text(message.clone()).size(14).color(RED),
        };

        let uploading = matches!(
            self.upload_state,
            UploadState::Uploading { .. } | UploadState::Analyzing
        );

        let percent = match &self.upload_state {
            UploadState::Uploading { percent } => f32::from(*percent),
            UploadState::Analyzing | UploadState::Succeeded { .. } => 100.0,
            _ => 0.0,
        };

        column![
            text("Upload Capture").size(26),
            text_input("Analysis API base URL", &self.api_base)
                .on_input(Message::ApiBaseChanged)
                .padding(6),
            text_input("Path to .pcapng capture", &self.capture_path)
                .on_input(Message::PathChanged)
                .padding(6),
            row![
                button("Upload and Analyze")
                    .on_press_maybe((!uploading).then_some(Message::StartUpload))
                    .padding(10),
                button("Cancel")
                    .on_press_maybe(uploading.then_some(Message::CancelUpload))
                    .padding(10),
            ]
            .spacing(8),
            progress_bar(0.0..=100.0, percent),
            progress_line,
            text("Only .pcapng captures are accepted. A successful upload replaces the cached analysis used by every page.")
                .size(12),
        ]
        .spacing(10)
        .width(Length::Fixed(520.0))
        .into()
    }

    fn view_overview(&self) -> Element<'_, Message> {
        let Some(view) = &self.overview else {
            return text("Loading overview...").size(16).into();
        };

        let mut content = Column::new().spacing(12);

        if let Some(notice) = &view.notice {
            content = content.push(notice_banner(notice));
        }
        if let Some(metadata) = &view.metadata {
            content = content.push(
                text(format!("Analyzed: {}", metadata.original_filename)).size(14),
            );
        }

        let total = view.model.total_packets;
        let mut cards = row![stat_card(
            "Total Packets",
            total.to_string(),
            "captured frames".into(),
            packet_count_severity(total),
        )]
        .spacing(10);
        if let Some(stats) = &view.model.stats {
            let (duration, duration_label) = format_capture_duration(stats.capture_duration);
            cards = cards
                .push(stat_card(
                    "Avg Packet Size",
                    format!("{:.2} B", stats.avg_packet_size),
                    format!("{}-{} B range", stats.min_packet_size, stats.max_packet_size),
                    packet_size_severity(stats.avg_packet_size),
                ))
                .push(stat_card(
                    "Capture Duration",
                    duration,
                    duration_label.into(),
                    capture_duration_severity(stats.capture_duration),
                ))
                .push(stat_card(
                    "Packet Rate",
                    format!("{:.1} pkt/s", stats.packets_per_second),
                    "mean throughput".into(),
                    packet_rate_severity(stats.packets_per_second),
                ));
        }
        content = content.push(cards);

        content = content.push(distribution_table(
            "Protocol Distribution",
            &view.model.protocol_distribution,
        ));
        content = content.push(distribution_table(
            "Packet Types",
            &view.model.packet_type_distribution,
        ));

        if let Some(categories) = &view.model.delay_categories {
            let mut delays = Column::new().spacing(4).push(text("Delay Categories").size(18));
            for (key, stat) in categories {
                delays = delays.push(
                    text(format!(
                        "{}: avg {:.2} ms, max {:.2} ms ({} samples)",
                        delay_category_title(key),
                        stat.avg,
                        stat.max,
                        stat.count
                    ))
                    .size(13),
                );
            }
            content = content.push(delays);
        }

        if let Some(loss) = &view.model.packet_loss {
            content = content.push(
                text(format!(
                    "Packet loss: {:.2}% ({} of {} packets, {} events)",
                    loss.overall.loss_percentage,
                    loss.overall.total_lost_packets.unwrap_or(0),
                    loss.overall.total_transmitted.unwrap_or(0),
                    loss.overall.loss_events
                ))
                .size(13),
            );
        }

        if let Some(ports) = &view.model.port_stats {
            if !ports.top_destinations.is_empty() {
                let mut list = Column::new()
                    .spacing(4)
                    .push(text("Top Destination Ports").size(18));
                for entry in &ports.top_destinations {
                    let service = service_name(entry.port);
                    let suffix = if service.is_empty() {
                        String::new()
                    } else {
                        format!(" ({service})")
                    };
                    list = list.push(
                        text(format!("{}{}: {} packets", entry.port, suffix, entry.packets))
                            .size(13),
                    );
                }
                content = content.push(list);
            }
        }
        if let Some(ips) = &view.model.ip_stats {
            if !ips.top_sources.is_empty() {
                let mut list = Column::new().spacing(4).push(text("Top Source IPs").size(18));
                for entry in &ips.top_sources {
                    list = list
                        .push(text(format!("{}: {} packets", entry.ip, entry.packets)).size(13));
                }
                content = content.push(list);
            }
        }

        content = content.push(button("Download data.json").on_press(Message::SaveOverview).padding(8));
        content.into()
    }

    fn view_search(&self) -> Element<'_, Message> {
        let mut protocols = vec![ALL_PROTOCOLS.to_string()];
        protocols.extend(distinct_protocols(&self.packets));
        let mut sources = vec![ALL_SOURCES.to_string()];
        sources.extend(distinct_sources(&self.packets));
        let mut destinations = vec![ALL_DESTINATIONS.to_string()];
        destinations.extend(distinct_destinations(&self.packets));

        let filters = row![
            text_input("Search source, destination, protocol, info...", &self.filter.query)
                .on_input(Message::QueryChanged)
                .padding(6)
                .width(Length::Fixed(280.0)),
            pick_list(
                protocols,
                Some(
                    self.filter
                        .protocol
                        .clone()
                        .unwrap_or_else(|| ALL_PROTOCOLS.to_string())
                ),
                Message::ProtocolSelected
            ),
            pick_list(
                sources,
                Some(
                    self.filter
                        .source
                        .clone()
                        .unwrap_or_else(|| ALL_SOURCES.to_string())
                ),
                Message::SourceSelected
            ),
            pick_list(
                destinations,
                Some(
                    self.filter
                        .destination
                        .clone()
                        .unwrap_or_else(|| ALL_DESTINATIONS.to_string())
                ),
                Message::DestinationSelected
            ),
            pick_list(
                LengthTier::ALL,
                Some(self.filter.length),
                Message::LengthSelected
            ),
            button("Clear").on_press(Message::ClearFilters).padding(6),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let filtered = self.filter.apply(&self.packets);
        let last_page = filtered.len().div_ceil(PAGE_SIZE).max(1);
        let page = page_slice(&filtered, self.current_page, PAGE_SIZE);

        let header = row![
            text("No.").size(12).width(Length::Fixed(60.0)),
            text("Time").size(12).width(Length::Fixed(100.0)),
            text("Source").size(12).width(Length::Fixed(140.0)),
            text("Destination").size(12).width(Length::Fixed(140.0)),
            text("Protocol").size(12).width(Length::Fixed(80.0)),
            text("Length").size(12).width(Length::Fixed(70.0)),
            text("Info").size(12).width(Length::Fill),
        ]
        .spacing(4);

        let rows = if page.is_empty() {
            Column::new().push(text("No packets match the current filters").size(13))
        } else {
            page.iter().fold(Column::new().spacing(2), |col, packet| {
                col.push(
                    row![
                        text(packet.number.to_string()).size(12).width(Length::Fixed(60.0)),
                        text(packet.time.clone()).size(12).width(Length::Fixed(100.0)),
                        text(packet.source.clone()).size(12).width(Length::Fixed(140.0)),
                        text(packet.destination.clone()).size(12).width(Length::Fixed(140.0)),
                        text(packet.protocol.clone()).size(12).width(Length::Fixed(80.0)),
                        text(packet.length.to_string()).size(12).width(Length::Fixed(70.0)),
                        text(packet.info.clone()).size(12).width(Length::Fill),
                    ]
                    .spacing(4),
                )
            })
        };

        let pagination = row![
            button("Previous")
                .on_press_maybe((self.current_page > 1).then_some(Message::PrevPage))
                .padding(6),
            text(format!(
                "Page {} of {} ({} packets)",
                self.current_page,
                last_page,
                filtered.len()
            ))
            .size(13),
            button("Next")
                .on_press_maybe((self.current_page < last_page).then_some(Message::NextPage))
                .padding(6),
            button("Download filtered").on_press(Message::SaveFiltered).padding(6),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let mut content = Column::new()
            .spacing(10)
            .push(text("Packet Search").size(26));
        if let Some(notice) = &self.packets_notice {
            content = content.push(notice_banner(notice));
        }
        content
            .push(filters)
            .push(header)
            .push(rows)
            .push(pagination)
            .into()
    }

    fn view_visualization(&self) -> Element<'_, Message> {
        let chart = Canvas::new(MultiLineChart {
            series: self.latency.clone(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(320.0));

        let legend = if self.latency.is_empty() {
            Column::new().push(text("No latency data yet").size(13))
        } else {
            self.latency
                .iter()
                .enumerate()
                .fold(Column::new().spacing(2), |col, (index, series)| {
                    col.push(
                        text(format!("{} ({} points)", series.protocol, series.xs.len()))
                            .size(13)
                            .color(series_color(index)),
                    )
                })
        };

        let mut content = Column::new()
            .spacing(10)
            .push(text("Latency Distribution").size(26));
        if let Some(notice) = &self.latency_notice {
            content = content.push(notice_banner(notice));
        }
        content
            .push(text("Per-protocol latency density curves").size(14))
            .push(chart)
            .push(legend)
            .into()
    }
}

const GREEN: Color = Color::from_rgb(0.30, 0.75, 0.42);
const AMBER: Color = Color::from_rgb(0.85, 0.62, 0.15);
const RED: Color = Color::from_rgb(0.85, 0.30, 0.28);
const GRAY: Color = Color::from_rgb(0.25, 0.27, 0.32);

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Default => GRAY,
        Severity::Low => GREEN,
        Severity::Medium => AMBER,
        Severity::High => RED,
    }
}

fn series_color(index: usize) -> Color {
    match index % 5 {
        0 => Color::from_rgb(0.18, 0.72, 0.89),
        1 => Color::from_rgb(0.95, 0.55, 0.20),
        2 => Color::from_rgb(0.30, 0.75, 0.42),
        3 => Color::from_rgb(0.80, 0.40, 0.85),
        _ => Color::from_rgb(0.90, 0.85, 0.30),
    }
}

fn nav_button(label: &str, target: Page, current: Page) -> Element<'_, Message> {
    button(text(label).size(14))
        .on_press_maybe((target != current).then_some(Message::Navigate(target)))
        .padding(8)
        .into()
}

fn notice_banner(notice: &str) -> Element<'_, Message> {
    container(text(notice).size(13).color(Color::WHITE))
        .padding(10)
        .width(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(Background::Color(AMBER)),
            border: Border {
                radius: 4.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

fn stat_card(
    title: &str,
    value: String,
    subtitle: String,
    severity: Severity,
) -> Element<'_, Message> {
    let color = severity_color(severity);
    container(
        column![
            text(title.to_string()).size(13),
            text(value).size(24),
            text(subtitle).size(11),
        ]
        .spacing(4),
    )
    .padding(12)
    .width(Length::Fill)
    .style(move |_theme| container::Style {
        background: Some(Background::Color(color)),
        text_color: Some(Color::WHITE),
        border: Border {
            radius: 6.0.into(),
            ..Border::default()
        },
        ..container::Style::default()
    })
    .into()
}

fn distribution_table<'a>(
    title: &'a str,
    entries: &[pcapcore::model::DistributionEntry],
) -> Element<'a, Message> {
    let mut sorted = entries.to_vec();
    sort_by_percentage_desc(&mut sorted);
    let mut table = Column::new().spacing(4).push(text(title).size(18));
    if sorted.is_empty() {
        table = table.push(text("No data").size(13));
    } else {
        for entry in &sorted {
            table = table.push(
                text(format!(
                    "{:<12} {:>10} packets  {:>6.2}%",
                    entry.name, entry.packets, entry.percentage
                ))
                .size(13),
            );
        }
    }
    table.into()
}

fn build_loader(api_base: &str) -> Option<SessionLoader> {
    let client = ApiClient::new(api_base, FETCH_TIMEOUT).ok()?;
    Some(SessionLoader::new(
        client,
        Arc::new(FileCacheStore::new(DATA_DIR)),
        Arc::new(FileMetadataStore::new(
            Path::new(DATA_DIR).join("analysis-metadata.json"),
        )),
        Arc::new(IngestMetrics::new()),
    ))
}

async fn fetch_overview_view(api_base: String, generation: u64) -> (u64, LoadedView) {
    match build_loader(&api_base) {
        Some(loader) => (generation, loader.load_overview().await),
        None => {
            let raw = sample_response();
            (
                generation,
                LoadedView {
                    model: normalize(&raw),
                    raw,
                    source: DataSource::Sample,
                    metadata: None,
                    notice: Some(
                        "Invalid API base URL. Using fallback sample data instead.".into(),
                    ),
                },
            )
        }
    }
}

async fn fetch_packet_view(api_base: String, generation: u64) -> (u64, LoadedPackets) {
    match build_loader(&api_base) {
        Some(loader) => (generation, loader.load_packets().await),
        None => (
            generation,
            LoadedPackets {
                packets: Vec::new(),
                source: DataSource::Sample,
                notice: Some("Invalid API base URL. No packet data available.".into()),
            },
        ),
    }
}

async fn fetch_latency_view(api_base: String, generation: u64) -> (u64, LoadedLatency) {
    match build_loader(&api_base) {
        Some(loader) => (generation, loader.load_latency().await),
        None => (
            generation,
            LoadedLatency {
                series: Vec::new(),
                source: DataSource::Sample,
                notice: Some("Invalid API base URL. No latency data available.".into()),
            },
        ),
    }
}

#[derive(Clone)]
struct MultiLineChart {
    series: Vec<LatencySeries>,
}

impl canvas::Program<Message> for MultiLineChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.07),
        );

        let margin = 24.0_f32;
        let plot_width = (bounds.width - 2.0 * margin).max(1.0);
        let plot_height = (bounds.height - 2.0 * margin).max(1.0);

        let axes = CanvasPath::new(|builder| {
            builder.move_to(Point::new(margin, margin));
            builder.line_to(Point::new(margin, bounds.height - margin));
            builder.line_to(Point::new(bounds.width - margin, bounds.height - margin));
        });
        frame.stroke(
            &axes,
            Stroke::default()
                .with_color(Color::from_rgb(0.35, 0.35, 0.45))
                .with_width(1.0),
        );

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for series in &self.series {
            for &x in &series.xs {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
            for &y in &series.ys {
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
        if !min_x.is_finite() || !min_y.is_finite() {
            return vec![frame.into_geometry()];
        }
        let span_x = (max_x - min_x).max(f64::EPSILON);
        let span_y = (max_y - min_y).max(f64::EPSILON);

        for (index, series) in self.series.iter().enumerate() {
            if series.xs.len() < 2 {
                continue;
            }
            let path = CanvasPath::new(|builder| {
                for (i, (&x, &y)) in series.xs.iter().zip(series.ys.iter()).enumerate() {
                    let px = margin + (((x - min_x) / span_x) as f32) * plot_width;
                    let py =
                        bounds.height - margin - (((y - min_y) / span_y) as f32) * plot_height;
                    if i == 0 {
                        builder.move_to(Point::new(px, py));
                    } else {
                        builder.line_to(Point::new(px, py));
                    }
                }
            });
            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(series_color(index)),
            );
        }

        vec![frame.into_geometry()]
    }
}
