//! The navigation bar shown at the top of every signed-in page.

use maud::{Markup, html};

use crate::endpoints;

/// The top level sections of the app, in display order.
const SECTIONS: [(&str, &str); 4] = [
    (endpoints::HOME_VIEW, "Home"),
    (endpoints::EXPENSES_VIEW, "Expenses"),
    (endpoints::CHARTS_VIEW, "Charts"),
    (endpoints::PROFILE_VIEW, "Profile"),
];

const SECTION_STYLE: &str = "block py-2 px-3 rounded-sm text-gray-900 hover:bg-gray-100 \
    lg:p-0 lg:hover:bg-transparent lg:hover:text-blue-700 \
    dark:text-white dark:hover:bg-gray-700 lg:dark:hover:text-blue-500 lg:dark:hover:bg-transparent";

const CURRENT_SECTION_STYLE: &str = "block py-2 px-3 rounded-sm text-white bg-blue-700 \
    lg:p-0 lg:bg-transparent lg:text-blue-700 dark:text-white lg:dark:text-blue-500";

const TAB_STYLE: &str = "flex items-center justify-center rounded-lg px-2 py-2 text-xs \
    font-semibold text-gray-600 hover:text-blue-700 dark:text-gray-300 dark:hover:text-blue-200";

const CURRENT_TAB_STYLE: &str = "flex items-center justify-center rounded-lg px-2 py-2 text-xs \
    font-semibold bg-blue-50 text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";

/// Whether `page` belongs to the section rooted at `section`, e.g. "/expenses/new" is part of
/// "/expenses".
fn in_section(page: &str, section: &str) -> bool {
    page.strip_prefix(section)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub struct NavBar<'a> {
    current_page: &'a str,
}

impl<'a> NavBar<'a> {
    /// A nav bar that highlights the section containing `current_page`.
    pub fn new(current_page: &'a str) -> Self {
        Self { current_page }
    }

    fn current_section(&self) -> Option<&'static str> {
        SECTIONS
            .iter()
            .map(|(url, _)| *url)
            .find(|url| in_section(self.current_page, url))
    }

    pub fn into_html(self) -> Markup {
        let current = self.current_section();

        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::HOME_VIEW) class="flex items-center gap-3"
                    {
                        img src="/static/favicon-128x128.png" alt="" class="h-8";
                        span class="text-2xl font-semibold dark:text-white" { "Pocketbook" }
                    }

                    ul class="hidden lg:flex lg:gap-8 font-medium"
                    {
                        @for (url, title) in SECTIONS {
                            @let is_current = current == Some(url);
                            li {
                                a
                                    href=(url)
                                    class=(if is_current { CURRENT_SECTION_STYLE } else { SECTION_STYLE })
                                    aria-current=[is_current.then_some("page")]
                                { (title) }
                            }
                        }

                        li { a href=(endpoints::LOG_OUT) class=(SECTION_STYLE) { "Log out" } }
                    }
                }
            }

            // Bottom tab bar for small screens.
            nav
                class="fixed inset-x-0 bottom-0 z-40 lg:hidden border-t border-gray-200
                bg-white/95 dark:border-gray-700 dark:bg-gray-900/95"
                aria-label="Sections"
            {
                ul class="grid grid-cols-4 gap-1 px-2 py-3"
                {
                    @for (url, title) in SECTIONS {
                        @let is_current = current == Some(url);
                        li {
                            a
                                href=(url)
                                class=(if is_current { CURRENT_TAB_STYLE } else { TAB_STYLE })
                                aria-current=[is_current.then_some("page")]
                            { (title) }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::NavBar;

    fn current_sections(page: &str) -> Vec<String> {
        let html = Html::parse_fragment(&NavBar::new(page).into_html().into_string());
        let selector = Selector::parse("a[aria-current=page]").unwrap();

        html.select(&selector)
            .map(|link| link.text().collect::<String>())
            .collect()
    }

    #[test]
    fn highlights_the_current_section_in_both_bars() {
        assert_eq!(current_sections(endpoints::HOME_VIEW), ["Home", "Home"]);
        assert_eq!(current_sections(endpoints::CHARTS_VIEW), ["Charts", "Charts"]);
        assert_eq!(current_sections(endpoints::PROFILE_VIEW), ["Profile", "Profile"]);
    }

    #[test]
    fn expense_forms_belong_to_expenses() {
        assert_eq!(current_sections(endpoints::NEW_EXPENSE_VIEW), ["Expenses", "Expenses"]);
        assert_eq!(current_sections("/expenses/12/edit"), ["Expenses", "Expenses"]);
    }

    #[test]
    fn other_pages_highlight_nothing() {
        assert!(current_sections(endpoints::LOG_IN_VIEW).is_empty());
        assert!(current_sections(endpoints::INTERNAL_ERROR_VIEW).is_empty());
        assert!(current_sections("/homepage").is_empty());
    }
}
