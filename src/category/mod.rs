//! Categories label expenses. The category named "Income" marks money coming in.

mod create;
mod db;
mod delete;
mod domain;

pub use create::{create_category_endpoint, new_category_form};
pub use db::{
    create_category, create_category_table, delete_category, get_categories,
    get_manageable_categories, get_or_create_category_by_name, seed_default_categories,
};
pub use delete::delete_category_endpoint;
pub use domain::{
    Category, CategoryFormData, CategoryId, CategoryName, DEFAULT_CATEGORIES, is_income,
};
