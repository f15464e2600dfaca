//! Shared page layout, styles and formatting helpers for the maud templates.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

use crate::endpoints;

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "w-full py-2.5 px-5 mb-2 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Category badge style
pub const CATEGORY_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-blue-800 bg-blue-100 rounded-full \
    dark:bg-blue-900 dark:text-blue-300";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// Extra tags for a page's `<head>`.
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// Inline JavaScript.
    ScriptSource(PreEscaped<String>),
    Style(PreEscaped<String>),
}

impl HeadElement {
    fn to_html(&self) -> Markup {
        match self {
            HeadElement::ScriptLink(path) => html!(script src=(path) {}),
            HeadElement::ScriptSource(source) => html!(script { (source) }),
            HeadElement::Style(css) => html!(style { (css) }),
        }
    }
}

const BASE_STYLES: &str = "
#indicator.htmx-indicator, #indicator .htmx-indicator { display: none; }
#indicator.htmx-request.htmx-indicator, #indicator.htmx-request .htmx-indicator { display: inline; }
.echarts-tooltip { z-index: 30 !important; }
";

/// The page skeleton: stylesheet, HTMX, the alert container and `content`.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | Pocketbook" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link rel="stylesheet" href="/static/main.css";
                script src="/static/htmx-2.0.8-min.js" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" {}
                style { (PreEscaped(BASE_STYLES)) }

                @for element in head_elements {
                    (element.to_html())
                }
            }

            body
                hx-ext="response-targets"
                class="min-h-screen bg-gray-50 dark:bg-gray-900 pb-20 lg:pb-0"
            {
                (content)

                // Filled by HTMX error responses.
                div
                    id="alert-container"
                    class="hidden fixed bottom-4 left-1/2 -translate-x-1/2 z-50 w-full max-w-md px-4"
                {}
            }
        }
    }
}

/// A full page error message with a link back home.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        main class="mx-auto max-w-screen-sm px-4 py-16 text-center text-gray-900 dark:text-white"
        {
            h1 class="mb-4 text-7xl font-extrabold text-blue-600 dark:text-blue-500" { (header) }
            p class="mb-4 text-3xl font-bold" { (description) }
            p class="mb-8 text-xl" { (fix) }
            a href=(endpoints::ROOT) class=(BUTTON_PRIMARY_STYLE) { "Back to Home" }
        }
    );

    base(title, &[], &content)
}

/// The centred card holding the log-in, registration and forgot password forms.
pub fn auth_card(heading: &str, form: &Markup) -> Markup {
    html! {
        main class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            div class="flex items-center gap-2 mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                img class="w-8 h-8" src="/static/favicon-128x128.png" alt="";
                "Pocketbook"
            }

            div class="w-full sm:max-w-md p-6 sm:p-8 space-y-6 bg-white rounded-lg shadow dark:bg-gray-800"
            {
                h1 class="text-xl md:text-2xl font-bold text-gray-900 dark:text-white" { (heading) }
                (form)
            }
        }
    }
}

/// An input with a label and an optional error message underneath.
///
/// The message directly follows the input so it can be styled as its sibling.
fn labelled_input(id: &str, label: &str, input: Markup, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }
            (input)

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

pub fn email_input(email: &str, error_message: Option<&str>) -> Markup {
    let input = html!(
        input type="email" name="email" id="email" placeholder="name@example.com"
            class=(FORM_TEXT_INPUT_STYLE) required autofocus value=(email);
    );

    labelled_input("email", "Email", input, error_message)
}

pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    let input = html!(
        input type="password" name="password" id="password" placeholder="••••••••"
            class=(FORM_TEXT_INPUT_STYLE) required minlength=(min_length) value=(password);
    );

    labelled_input("password", "Password", input, error_message)
}

/// Shown inside submit buttons while a request is in flight.
pub fn loading_spinner() -> Markup {
    html! {
        span
            aria-hidden="true"
            class="inline-block w-4 h-4 me-2 align-middle rounded-full border-2
                border-white border-t-transparent animate-spin"
        {}
    }
}

/// Returns the CSS styles for adding a rupee sign prefix to number inputs.
pub fn rupee_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper {
            position: relative;
            display: inline-block;
        }
        .input-wrapper input[type="number"] {
            padding-left: 1.4rem;
        }
        .input-wrapper::before {
            content: '₹';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}

/// Regroup the integer part of a numfmt currency string into lakhs and crores,
/// e.g. "₹1,234,567.50" becomes "₹12,34,567.50".
fn indian_grouping(formatted: &str) -> String {
    let (symbol, rest) = match formatted.strip_prefix('₹') {
        Some(rest) => ("₹", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match rest.find('.') {
        Some(dot) => rest.split_at(dot),
        None => (rest, ""),
    };
    let digits: Vec<char> = integer.chars().filter(|c| *c != ',').collect();

    if digits.len() <= 3 {
        return format!("{symbol}{}{fraction}", digits.iter().collect::<String>());
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut grouped = String::new();
    for (i, digit) in head.iter().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    grouped.push(',');
    grouped.extend(last_three);

    format!("{symbol}{grouped}{fraction}")
}

fn rupee_formatter(decimals: u8) -> Formatter {
    Formatter::currency("₹")
        .unwrap_or_else(|_| Formatter::new())
        .precision(Precision::Decimals(decimals))
}

/// Format `number` as rupees with two decimal places, e.g. "₹1,50,000.50".
pub fn format_currency(number: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();
    let fmt = FMT.get_or_init(|| rupee_formatter(2));

    let magnitude = (number.abs() * 100.0).round() / 100.0;
    let sign = if number < 0.0 && magnitude > 0.0 { "-" } else { "" };

    // numfmt renders zero as "0" and drops trailing zeros in the fraction.
    let mut formatted = if magnitude > 0.0 {
        indian_grouping(&fmt.fmt_string(magnitude))
    } else {
        "₹0.00".to_owned()
    };

    match formatted.rfind('.') {
        None => formatted.push_str(".00"),
        Some(dot) if formatted.len() - dot == 2 => formatted.push('0'),
        Some(_) => {}
    }

    format!("{sign}{formatted}")
}

/// Format `number` as whole rupees, e.g. "₹12,34,567" or "-₹50".
pub fn format_currency_rounded(number: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();
    let fmt = FMT.get_or_init(|| rupee_formatter(0));

    let number = number.round();

    if number < 0.0 {
        format!("-{}", indian_grouping(&fmt.fmt_string(number.abs())))
    } else if number > 0.0 {
        indian_grouping(&fmt.fmt_string(number))
    } else {
        "₹0".to_owned()
    }
}

/// Creates a span with `amount` rounded to the nearest whole number and a
/// tooltip (title) that shows `amount` rounded to two decimal places.
pub fn currency_rounded_with_tooltip(amount: f64) -> Markup {
    html!(
        span title=(format_currency(amount)) { (format_currency_rounded(amount)) }
    )
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}
