use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, RawQuery, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::aggregate,
    auth::{UserID, get_user_by_id},
    bank::get_banks,
    category::get_categories,
    charts::builders::{ChartView, ChartsUpdate, chart_views},
    endpoints,
    expense::{FilterOptions, FilterQuery, filter_form, get_expense_records},
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_now,
};

const CHART_STYLE: &str = "min-h-[380px] rounded dark:bg-gray-100";

const EMPTY_CHART_STYLE: &str =
    "min-h-[380px] flex items-center justify-center text-gray-500 dark:text-gray-400";

/// The state needed for the charts page.
#[derive(Debug, Clone)]
pub struct ChartsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Serialize a chart update so it can be placed inside a `<script>` tag.
pub(super) fn charts_json(update: &ChartsUpdate) -> Result<String, Error> {
    serde_json::to_string(update)
        .map(|json| json.replace("</", "<\\/"))
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

fn chart_cards(charts: &[ChartView]) -> Markup {
    let with_hidden = |style: &str, hidden: bool| {
        if hidden {
            format!("{style} hidden")
        } else {
            style.to_owned()
        }
    };

    html! {
        section id="charts" class="grid grid-cols-1 xl:grid-cols-2 gap-4 w-full"
        {
            @for chart in charts {
                div class="rounded-lg bg-white dark:bg-gray-800 shadow-md p-4 flex flex-col"
                {
                    h2 id={ (chart.id) "-title" } class="text-lg font-semibold mb-2"
                    {
                        (chart.title)
                    }

                    div
                        id=(chart.id)
                        class=(with_hidden(CHART_STYLE, chart.options.is_none()))
                    {}

                    p
                        id={ (chart.id) "-empty" }
                        class=(with_hidden(EMPTY_CHART_STYLE, chart.options.is_some()))
                        data-empty-state="true"
                    {
                        "No data"
                    }
                }
            }
        }
    }
}

/// Draws the initial charts and redraws them for every update from `stream_url`.
fn charts_script(initial_json: &str, stream_url: &str) -> Result<HeadElement, Error> {
    let stream_url = serde_json::to_string(stream_url)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
    const charts = {{}};
    const currency = new Intl.NumberFormat('en-IN', {{
        style: 'currency',
        currency: 'INR',
        minimumFractionDigits: 2,
        maximumFractionDigits: 2
    }});
    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');

    function render(view) {{
        const chartDom = document.getElementById(view.id);
        const emptyDom = document.getElementById(view.id + '-empty');
        const titleDom = document.getElementById(view.id + '-title');
        if (titleDom) {{
            titleDom.textContent = view.title;
        }}

        if (!view.options) {{
            if (charts[view.id]) {{
                charts[view.id].dispose();
                delete charts[view.id];
            }}
            chartDom.classList.add('hidden');
            emptyDom.classList.remove('hidden');
            return;
        }}

        chartDom.classList.remove('hidden');
        emptyDom.classList.add('hidden');

        if (!charts[view.id]) {{
            charts[view.id] = echarts.init(chartDom, darkModeMediaQuery.matches ? 'dark' : 'default');
        }}

        const options = view.options;
        if (options.tooltip) {{
            options.tooltip.forEach(function(tooltip) {{
                if (tooltip.trigger === 'axis') {{
                    tooltip.valueFormatter = function(value) {{ return currency.format(value); }};
                }}
            }});
        }}
        charts[view.id].setOption(options, true);
    }}

    function renderAll(update) {{
        update.charts.forEach(render);
    }}

    window.addEventListener('resize', function() {{
        Object.values(charts).forEach(function(chart) {{ chart.resize(); }});
    }});
    darkModeMediaQuery.addEventListener('change', function() {{
        Object.values(charts).forEach(function(chart) {{
            chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
        }});
    }});

    renderAll({initial_json});

    const source = new EventSource({stream_url});
    source.addEventListener('charts', function(event) {{
        renderAll(JSON.parse(event.data));
    }});
}});"#
    );

    Ok(HeadElement::ScriptSource(PreEscaped(script)))
}

/// Renders the category pies and the monthly income and expense bars.
///
/// The page keeps itself up to date through [endpoints::CHARTS_STREAM] using
/// the same filter query it was loaded with.
pub async fn get_charts_page(
    State(state): State<ChartsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let user = get_user_by_id(user_id, &connection)?;
    let records = get_expense_records(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let banks = if user.track_banks {
        Some(get_banks(user_id, &connection)?)
    } else {
        None
    };
    drop(connection);

    let period = query.period();
    let aggregates = aggregate(&records, &query.record_filter(), &period, today);
    let update = ChartsUpdate {
        charts: chart_views(&aggregates, &period),
    };
    let stream_url = match raw_query.as_deref() {
        Some(raw_query) if !raw_query.is_empty() => {
            format!("{}?{raw_query}", endpoints::CHARTS_STREAM)
        }
        _ => endpoints::CHARTS_STREAM.to_owned(),
    };

    let head_elements = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts_json(&update)?, &stream_url)?,
    ];

    let nav_bar = NavBar::new(endpoints::CHARTS_VIEW).into_html();
    let filters = filter_form(
        &query,
        &FilterOptions {
            action: endpoints::CHARTS_VIEW,
            categories: &categories,
            banks: banks.as_deref(),
            years: Some(&aggregates.years),
        },
    );

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                h1 class="text-xl font-bold" { "Charts" }

                (filters)

                (chart_cards(&update.charts))
            }
        }
    };

    Ok(base("Charts", &head_elements, &content).into_response())
}
