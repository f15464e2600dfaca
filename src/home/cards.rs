use maud::{Markup, html};

use crate::{
    aggregation::{CategoryTotals, MonthlySummary},
    html::{CATEGORY_BADGE_STYLE, currency_rounded_with_tooltip, format_currency_rounded},
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col gap-1";

fn summary_card(title: &str, amount: Markup, value_class: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            span class="text-sm text-gray-600 dark:text-gray-400" { (title) }
            span class={ "text-2xl font-bold " (value_class) } data-summary=(title) { (amount) }
        }
    }
}

/// Balance, income and expense cards for one month.
pub(super) fn summary_cards(summary: &MonthlySummary) -> Markup {
    let balance_class = if summary.balance < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-gray-900 dark:text-white"
    };

    html! {
        div class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full"
        {
            // format_currency_rounded puts the minus sign in front of the rupee sign.
            (summary_card(
                "Balance",
                html! { (format_currency_rounded(summary.balance)) },
                balance_class,
            ))
            (summary_card(
                "Income",
                currency_rounded_with_tooltip(summary.income),
                "text-green-700 dark:text-green-300",
            ))
            (summary_card(
                "Expenses",
                currency_rounded_with_tooltip(summary.expense),
                "text-red-700 dark:text-red-300",
            ))
        }
    }
}

/// Spending per category this month, largest first.
pub(super) fn category_breakdown(totals: &CategoryTotals) -> Markup {
    let mut totals = totals.iter().collect::<Vec<_>>();
    totals.sort_by(|(_, left), (_, right)| right.total_cmp(left));

    html! {
        @if !totals.is_empty() {
            ul class="flex flex-wrap gap-2 w-full"
            {
                @for (category, total) in totals {
                    li class=(CATEGORY_BADGE_STYLE)
                    {
                        (category) ": " (format_currency_rounded(*total))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod summary_cards_tests {
    use scraper::{Html, Selector};

    use crate::aggregation::{CategoryTotals, MonthlySummary};

    use super::{category_breakdown, summary_cards};

    fn summary_value(html: &Html, title: &str) -> String {
        html.select(&Selector::parse(&format!("[data-summary={title}]")).unwrap())
            .next()
            .unwrap_or_else(|| panic!("no {title} card"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[test]
    fn negative_balance_has_leading_minus() {
        let summary = MonthlySummary {
            income: 50.0,
            expense: 1250.0,
            balance: -1200.0,
        };

        let html = Html::parse_fragment(&summary_cards(&summary).into_string());

        assert_eq!(summary_value(&html, "Balance"), "-₹1,200");
        assert_eq!(summary_value(&html, "Income"), "₹50");
        assert_eq!(summary_value(&html, "Expenses"), "₹1,250");
    }

    #[test]
    fn breakdown_is_sorted_by_amount() {
        let totals = CategoryTotals::from([("Bills".to_owned(), 10.0), ("Food".to_owned(), 90.0)]);

        let html = Html::parse_fragment(&category_breakdown(&totals).into_string());

        let items = html
            .select(&Selector::parse("li").unwrap())
            .map(|item| item.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(items, ["Food: ₹90", "Bills: ₹10"]);
    }
}
