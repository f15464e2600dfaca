//! ECharts options for the three aggregate views.
//!
//! Options are sent to the browser as plain JSON, both inline on page load and
//! over the server-sent event stream, so formatters are ECharts string
//! templates rather than JavaScript functions.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, Emphasis, EmphasisFocus,
        ItemStyle, Tooltip, Trigger,
    },
    series::{Bar, Pie},
};
use serde::Serialize;

use crate::aggregation::{Aggregates, CategoryTotals, MonthlySeries, PeriodSelection};

pub(super) const PIE_PALETTE: [&str; 8] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#A28FD0", "#FF6384", "#36A2EB", "#FFCE56",
];
pub(super) const EXPENSE_PALETTE: [&str; 6] =
    ["#FF6384", "#FF9F40", "#FFCD56", "#4BC0C0", "#36A2EB", "#9966FF"];
pub(super) const INCOME_COLOR: &str = "#00C49F";

pub(super) const THIS_MONTH_CHART_ID: &str = "this-month-chart";
pub(super) const PERIOD_CHART_ID: &str = "period-chart";
pub(super) const MONTHLY_CHART_ID: &str = "monthly-chart";

/// One chart container and its options, `None` when there is nothing to plot.
#[derive(Serialize)]
pub(super) struct ChartView {
    pub id: &'static str,
    pub title: String,
    pub options: Option<Chart>,
}

/// The message pushed to the charts page for every snapshot.
#[derive(Serialize)]
pub(super) struct ChartsUpdate {
    pub charts: Vec<ChartView>,
}

fn pie_chart(title: &str, totals: &CategoryTotals) -> Option<Chart> {
    if totals.is_empty() {
        return None;
    }

    let data = totals
        .iter()
        .map(|(category, total)| (*total, category.as_str()))
        .collect::<Vec<_>>();

    let chart = Chart::new()
        .title(Title::new().text(title).left("center"))
        .color(PIE_PALETTE.iter().map(|color| Color::from(*color)).collect())
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .formatter("{b}: ₹{c} ({d}%)"),
        )
        .legend(Legend::new().bottom(0))
        .series(
            Pie::new()
                .name(title)
                .radius(vec!["35%", "65%"])
                .data(data),
        );

    Some(chart)
}

fn monthly_chart(series: &MonthlySeries) -> Option<Chart> {
    if series.rows.is_empty() {
        return None;
    }

    let labels = series
        .rows
        .iter()
        .map(|row| row.label.clone())
        .collect::<Vec<_>>();
    let income = series.rows.iter().map(|row| row.income).collect::<Vec<_>>();

    let mut chart = Chart::new()
        .title(Title::new().text("Income vs expenses").left(20))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().top(30))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter("₹{value}")),
        )
        .series(
            Bar::new()
                .name("Income")
                .stack("Income")
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .data(income),
        );

    for (index, category) in series.categories.iter().enumerate() {
        let values = series
            .rows
            .iter()
            .map(|row| row.expenses.get(category).copied().unwrap_or_default())
            .collect::<Vec<_>>();

        chart = chart.series(
            Bar::new()
                .name(category.as_str())
                .stack("Expenses")
                .item_style(ItemStyle::new().color(EXPENSE_PALETTE[index % EXPENSE_PALETTE.len()]))
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(values),
        );
    }

    Some(chart)
}

/// Build every chart on the page from one set of aggregates.
pub(super) fn chart_views(aggregates: &Aggregates, period: &PeriodSelection) -> Vec<ChartView> {
    let period_title = format!("Spending, {}", period.label());

    vec![
        ChartView {
            id: THIS_MONTH_CHART_ID,
            title: "Spending this month".to_owned(),
            options: pie_chart("This month", &aggregates.this_month),
        },
        ChartView {
            id: PERIOD_CHART_ID,
            options: pie_chart(&period.label(), &aggregates.period),
            title: period_title,
        },
        ChartView {
            id: MONTHLY_CHART_ID,
            title: "Income vs expenses by month".to_owned(),
            options: monthly_chart(&aggregates.monthly),
        },
    ]
}

#[cfg(test)]
mod chart_builder_tests {
    use serde_json::Value;
    use time::Month;

    use crate::aggregation::{
        Aggregates, CategoryTotals, MonthlyRow, MonthlySeries, PeriodSelection, Quarter,
    };

    use super::{
        EXPENSE_PALETTE, INCOME_COLOR, MONTHLY_CHART_ID, PERIOD_CHART_ID, THIS_MONTH_CHART_ID,
        chart_views,
    };

    fn totals(pairs: &[(&str, f64)]) -> CategoryTotals {
        pairs
            .iter()
            .map(|(name, total)| ((*name).to_owned(), *total))
            .collect()
    }

    fn example() -> Aggregates {
        Aggregates {
            this_month: totals(&[("Food", 100.0)]),
            period: totals(&[("Bills", 20.0), ("Food", 130.0)]),
            monthly: MonthlySeries {
                categories: vec!["Bills".to_owned(), "Food".to_owned()],
                rows: vec![
                    MonthlyRow {
                        year: 2024,
                        month: Month::March,
                        label: "Mar 2024".to_owned(),
                        income: 50.0,
                        expenses: totals(&[("Bills", 20.0), ("Food", 100.0)]),
                    },
                    MonthlyRow {
                        year: 2024,
                        month: Month::April,
                        label: "Apr 2024".to_owned(),
                        income: 0.0,
                        expenses: totals(&[("Bills", 0.0), ("Food", 30.0)]),
                    },
                ],
            },
            summary: Default::default(),
            years: vec![2024],
        }
    }

    fn to_json(aggregates: &Aggregates, period: &PeriodSelection) -> Value {
        serde_json::to_value(chart_views(aggregates, period)).unwrap()
    }

    #[test]
    fn empty_views_have_no_options() {
        let json = to_json(&Aggregates::default(), &PeriodSelection::all_time());

        let charts = json.as_array().unwrap();
        assert_eq!(charts.len(), 3);
        for chart in charts {
            assert!(chart["options"].is_null(), "{chart}");
        }
    }

    #[test]
    fn pie_data_follows_category_order() {
        let json = to_json(&example(), &PeriodSelection::all_time());

        let period_chart = &json[1];
        assert_eq!(period_chart["id"], PERIOD_CHART_ID);
        assert_eq!(period_chart["title"], "Spending, All time");
        let data = period_chart["options"]["series"][0]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|point| point["name"].as_str().unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(data, ["Bills", "Food"]);
        assert_eq!(json[0]["id"], THIS_MONTH_CHART_ID);
        assert_eq!(json[0]["options"]["color"][0], "#0088FE");
    }

    #[test]
    fn period_title_names_selection() {
        let period = PeriodSelection {
            year: Some(2024),
            quarter: Some(Quarter::Q2),
        };

        let json = to_json(&example(), &period);

        assert_eq!(json[1]["title"], "Spending, 2024 Q2");
    }

    #[test]
    fn monthly_chart_stacks_expenses_beside_income() {
        let json = to_json(&example(), &PeriodSelection::all_time());

        let chart = &json[2];
        assert_eq!(chart["id"], MONTHLY_CHART_ID);
        let series = chart["options"]["series"].as_array().unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0]["name"], "Income");
        assert_eq!(series[0]["itemStyle"]["color"], INCOME_COLOR);
        assert_eq!(series[1]["name"], "Bills");
        assert_eq!(series[1]["stack"], "Expenses");
        assert_eq!(series[1]["itemStyle"]["color"], EXPENSE_PALETTE[0]);
        assert_eq!(series[2]["name"], "Food");
        assert_eq!(series[2]["itemStyle"]["color"], EXPENSE_PALETTE[1]);
    }
}
