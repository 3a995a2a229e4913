//! Chart generation for the dashboard.
//!
//! Each chart is generated as JSON configuration for the ECharts library
//! via the charming crate and rendered into an HTML container with a small
//! initialization script.

use charming::{
    Chart,
    component::{Axis, Grid, Title, VisualMap, VisualMapPiece},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::{Line, bar},
};
use maud::PreEscaped;

use crate::{
    aggregation::{format_month_labels, net_by_month},
    html::HeadElement,
    transaction::Transaction,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Monthly net amounts (income minus expenses) as a line chart.
pub(super) fn net_income_chart(transactions: &[Transaction]) -> Chart {
    let monthly_totals = net_by_month(transactions);

    let mut months: Vec<_> = monthly_totals.keys().copied().collect();
    months.sort();

    let labels = format_month_labels(&months);
    let values: Vec<f64> = months.iter().map(|month| monthly_totals[month]).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Net income")
                .subtext("Last twelve months"),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .visual_map(VisualMap::new().show(false).pieces(vec![
            VisualMapPiece::new().lte(-1).color("red"),
            VisualMapPiece::new().gte(0).color("green"),
        ]))
        .series(Line::new().name("Net Income").data(values))
}

/// Expense totals per category as a bar chart.
pub(super) fn expenses_chart(expenses_by_category: &[(String, f64)]) -> Chart {
    let labels: Vec<String> = expenses_by_category
        .iter()
        .map(|(label, _)| label.clone())
        .collect();
    let values: Vec<f64> = expenses_by_category
        .iter()
        .map(|(_, total)| *total)
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by category")
                .subtext("Last twelve months"),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(bar::Bar::new().name("Expenses").data(values))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('pt-BR', {
              style: 'currency',
              currency: 'BRL'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
