use super::models::{CreateCategoryRequest, CreateItemRequest, UpdateCategoryRequest, UpdateItemRequest};
use crate::common::{ValidationResult, Validator};

// Field limits match the stored column widths.
const NAME_MAX: usize = 250;
const TITLE_MAX: usize = 80;
const DESCRIPTION_MAX: usize = 250;

fn check_category_name(result: &mut ValidationResult, name: &str) {
    if name.trim().is_empty() {
        result.add_error("name", "Category name is required");
    }
    if name.len() > NAME_MAX {
        result.add_error("name", "Category name must not exceed 250 characters");
    }
}

fn check_item_title(result: &mut ValidationResult, title: &str) {
    if title.trim().is_empty() {
        result.add_error("title", "Item title is required");
    }
    if title.len() > TITLE_MAX {
        result.add_error("title", "Item title must not exceed 80 characters");
    }
}

fn check_item_description(result: &mut ValidationResult, description: &Option<String>) {
    if let Some(description) = description {
        if description.len() > DESCRIPTION_MAX {
            result.add_error(
                "description",
                "Item description must not exceed 250 characters",
            );
        }
    }
}

impl Validator<CreateCategoryRequest> for CreateCategoryRequest {
    fn validate(&self, data: &CreateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_category_name(&mut result, &data.name);
        result
    }
}

impl Validator<UpdateCategoryRequest> for UpdateCategoryRequest {
    fn validate(&self, data: &UpdateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_category_name(&mut result, &data.name);
        result
    }
}

impl Validator<CreateItemRequest> for CreateItemRequest {
    fn validate(&self, data: &CreateItemRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_item_title(&mut result, &data.title);
        check_item_description(&mut result, &data.description);
        result
    }
}

impl Validator<UpdateItemRequest> for UpdateItemRequest {
    fn validate(&self, data: &UpdateItemRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(title) = &data.title {
            check_item_title(&mut result, title);
        }
        check_item_description(&mut result, &data.description);
        if let Some(category_id) = &data.category_id {
            if category_id.trim().is_empty() {
                result.add_error("category_id", "Category id must not be empty");
            }
        }
        result
    }
}
