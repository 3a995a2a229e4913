//! Summary cards for the dashboard: month income, month expenses, balance
//! and the overdue total, each with its change against the previous month.

use maud::{Markup, html};

use crate::html::format_currency;

/// How a card's amount should be tinted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CardAccent {
    /// Green, for money coming in.
    Positive,
    /// Red, for money going out.
    Negative,
    /// Follows the sign of the amount.
    Signed,
}

/// One summary card.
pub(super) struct SummaryCard {
    /// The card's heading.
    pub title: &'static str,
    /// The amount displayed front and centre.
    pub amount: f64,
    /// Percentage change against the previous month, if meaningful.
    pub delta: Option<f64>,
    /// How to tint the amount.
    pub accent: CardAccent,
}

/// Formats a percentage value, avoiding "-0%" display.
fn format_percentage(value: f64) -> String {
    let rounded = value.round();
    if rounded.abs() < 0.5 {
        "0".to_string()
    } else {
        format!("{:.0}", rounded)
    }
}

fn amount_style(card: &SummaryCard) -> &'static str {
    match card.accent {
        CardAccent::Positive => "text-green-600 dark:text-green-400",
        CardAccent::Negative => "text-red-600 dark:text-red-400",
        CardAccent::Signed if card.amount < 0.0 => "text-red-600 dark:text-red-400",
        CardAccent::Signed => "text-green-600 dark:text-green-400",
    }
}

/// Renders the grid of summary cards.
pub(super) fn summary_cards_view(cards: &[SummaryCard]) -> Markup {
    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" {
                @for card in cards {
                    (summary_card(card))
                }
            }
        }
    }
}

fn summary_card(card: &SummaryCard) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h4 class="text-sm font-semibold text-gray-600 dark:text-gray-400 mb-2"
            {
                (card.title)
            }

            div class={"text-2xl font-bold mb-1 " (amount_style(card))}
            {
                (format_currency(card.amount))
            }

            @if let Some(delta) = card.delta {
                div class="text-sm text-gray-600 dark:text-gray-400"
                {
                    @if delta >= 0.0 {
                        "↑ +" (format_percentage(delta)) "% vs last month"
                    } @else {
                        "↓ " (format_percentage(delta)) "% vs last month"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_percentage_avoids_negative_zero() {
        assert_eq!(format_percentage(0.0), "0");
        assert_eq!(format_percentage(-0.0), "0");
        assert_eq!(format_percentage(-0.4), "0");
        assert_eq!(format_percentage(0.4), "0");
        assert_eq!(format_percentage(5.0), "5");
        assert_eq!(format_percentage(-5.0), "-5");
    }

    #[test]
    fn card_shows_amount_and_delta() {
        let card = SummaryCard {
            title: "Income",
            amount: 5000.0,
            delta: Some(12.5),
            accent: CardAccent::Positive,
        };

        let rendered = summary_card(&card).into_string();

        assert!(rendered.contains("Income"));
        assert!(rendered.contains("R$5,000.00"));
        assert!(rendered.contains("+13%"));
    }

    #[test]
    fn card_without_delta_has_no_comparison_line() {
        let card = SummaryCard {
            title: "Balance",
            amount: 649.5,
            delta: None,
            accent: CardAccent::Signed,
        };

        let rendered = summary_card(&card).into_string();

        assert!(!rendered.contains("vs last month"));
    }

    #[test]
    fn signed_accent_follows_the_sign() {
        let positive = SummaryCard {
            title: "Balance",
            amount: 10.0,
            delta: None,
            accent: CardAccent::Signed,
        };
        let negative = SummaryCard {
            title: "Balance",
            amount: -10.0,
            delta: None,
            accent: CardAccent::Signed,
        };

        assert!(summary_card(&positive).into_string().contains("text-green-600"));
        assert!(summary_card(&negative).into_string().contains("text-red-600"));
    }
}
