use crate::db::repositories::CategoryRepository;
use crate::db::DbPool;
use crate::errors::{DatabaseError, ServiceError};
use crate::models::{Category, CategoryType, CreateCategory, UpdateCategory};
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};
use uuid::Uuid;

/// Name, icon and color of the categories every user starts with
pub const DEFAULT_INCOME_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Salary", "wallet", "#4CAF50"),
    ("Investments", "chart-line", "#2196F3"),
    ("Gifts", "gift", "#9C27B0"),
    ("Side Hustle", "briefcase", "#FF9800"),
];

pub const DEFAULT_EXPENSE_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Housing", "home", "#f44336"),
    ("Food", "restaurant", "#FF9800"),
    ("Transportation", "car", "#2196F3"),
    ("Entertainment", "movie", "#9C27B0"),
    ("Shopping", "shopping-cart", "#4CAF50"),
    ("Health", "hospital", "#607D8B"),
    ("Education", "school", "#795548"),
    ("Utilities", "bolt", "#FF5722"),
];

#[derive(Debug, Clone, Serialize)]
pub struct SystemCategories {
    pub income_categories: Vec<Category>,
    pub expense_categories: Vec<Category>,
}

impl SystemCategories {
    fn split(categories: Vec<Category>) -> Self {
        let (income_categories, expense_categories) = categories
            .into_iter()
            .partition(|c| c.category_type == CategoryType::Income);
        Self {
            income_categories,
            expense_categories,
        }
    }
}

/// Whether making `new_parent` the parent of `category_id` closes a loop.
/// `parents` maps each of the user's categories to its current parent.
pub fn creates_cycle(
    category_id: Uuid,
    new_parent: Uuid,
    parents: &HashMap<Uuid, Option<Uuid>>,
) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(new_parent);
    while let Some(id) = current {
        if id == category_id {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }
    false
}

fn system_category(
    user_id: Uuid,
    category_type: CategoryType,
    position: usize,
    (name, icon, color): (&str, &str, &str),
) -> Category {
    let now = Utc::now();
    Category {
        id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        description: None,
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        category_type,
        is_system: true,
        parent_id: None,
        position: position as i32,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
}

impl CategoryService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
        }
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Category, ServiceError> {
        self.categories
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category not found"))
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateCategory,
    ) -> Result<Category, ServiceError> {
        if let Some(parent_id) = request.parent_id {
            if self.categories.find_by_id(user_id, parent_id).await?.is_none() {
                return Err(ServiceError::not_found("Parent category not found"));
            }
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: request.name,
            description: request.description,
            icon: request.icon,
            color: request.color,
            category_type: request.category_type,
            is_system: false,
            parent_id: request.parent_id,
            position: request.position,
            created_at: now,
            updated_at: now,
        };
        self.categories.create(&category).await?;
        Ok(category)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Category>, ServiceError> {
        Ok(self.categories.list_top_level(user_id, skip, limit).await?)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: UpdateCategory,
    ) -> Result<Category, ServiceError> {
        let mut category = self.get(user_id, id).await?;
        if category.is_system {
            return Err(ServiceError::forbidden("Cannot modify system category"));
        }

        if let Some(parent_id) = changes.parent_id {
            if Some(parent_id) != category.parent_id {
                if self.categories.find_by_id(user_id, parent_id).await?.is_none() {
                    return Err(ServiceError::not_found("Parent category not found"));
                }
                let parents = self.parent_map(user_id).await?;
                if creates_cycle(id, parent_id, &parents) {
                    return Err(ServiceError::bad_request(
                        "Cannot set parent: would create a cycle",
                    ));
                }
            }
            category.parent_id = Some(parent_id);
        }

        if let Some(name) = changes.name {
            category.name = name;
        }
        if changes.description.is_some() {
            category.description = changes.description;
        }
        if changes.icon.is_some() {
            category.icon = changes.icon;
        }
        if changes.color.is_some() {
            category.color = changes.color;
        }
        if let Some(category_type) = changes.category_type {
            category.category_type = category_type;
        }
        if let Some(position) = changes.position {
            category.position = position;
        }
        category.updated_at = Utc::now();

        self.categories.update(&category).await?;
        Ok(category)
    }

    async fn parent_map(&self, user_id: Uuid) -> Result<HashMap<Uuid, Option<Uuid>>, DatabaseError> {
        let mut parents = HashMap::new();
        for category_type in CategoryType::ALL {
            for category in self.categories.list_by_type(user_id, *category_type).await? {
                parents.insert(category.id, category.parent_id);
            }
        }
        Ok(parents)
    }

    /// Delete a category; its children move up to its parent
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let category = self.get(user_id, id).await?;
        if category.is_system {
            return Err(ServiceError::forbidden("Cannot delete system category"));
        }
        self.categories
            .delete_and_reparent(user_id, id, category.parent_id)
            .await?;
        Ok(())
    }

    /// System categories, seeding the defaults on first access
    #[instrument(skip(self))]
    pub async fn system(&self, user_id: Uuid) -> Result<SystemCategories, ServiceError> {
        let existing = self.categories.list_system(user_id).await?;
        if !existing.is_empty() {
            return Ok(SystemCategories::split(existing));
        }

        let defaults: Vec<Category> = DEFAULT_INCOME_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, d)| system_category(user_id, CategoryType::Income, i, *d))
            .chain(
                DEFAULT_EXPENSE_CATEGORIES
                    .iter()
                    .enumerate()
                    .map(|(i, d)| system_category(user_id, CategoryType::Expense, i, *d)),
            )
            .collect();
        for category in &defaults {
            self.categories.create(category).await?;
        }

        info!(user_id = %user_id, count = defaults.len(), "Default categories created");
        Ok(SystemCategories::split(defaults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_parent_is_a_cycle() {
        let id = Uuid::new_v4();
        assert!(creates_cycle(id, id, &HashMap::new()));
    }

    #[test]
    fn test_descendant_parent_is_a_cycle() {
        let (root, child, grandchild) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let parents = HashMap::from([
            (root, None),
            (child, Some(root)),
            (grandchild, Some(child)),
        ]);

        assert!(creates_cycle(root, grandchild, &parents));
        assert!(!creates_cycle(grandchild, root, &parents));
    }

    #[test]
    fn test_existing_loop_terminates() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let parents = HashMap::from([(a, Some(b)), (b, Some(a))]);
        assert!(!creates_cycle(c, a, &parents));
    }

    #[test]
    fn test_system_categories_split_by_type() {
        let user_id = Uuid::new_v4();
        let categories = vec![
            system_category(user_id, CategoryType::Income, 0, DEFAULT_INCOME_CATEGORIES[0]),
            system_category(user_id, CategoryType::Expense, 0, DEFAULT_EXPENSE_CATEGORIES[0]),
            system_category(user_id, CategoryType::Expense, 1, DEFAULT_EXPENSE_CATEGORIES[1]),
        ];
        let split = SystemCategories::split(categories);

        assert_eq!(split.income_categories.len(), 1);
        assert_eq!(split.expense_categories[1].name, "Food");
        assert_eq!(split.expense_categories[1].position, 1);
        assert!(split.expense_categories.iter().all(|c| c.is_system));
    }

    #[test]
    fn test_default_set_sizes() {
        assert_eq!(DEFAULT_INCOME_CATEGORIES.len(), 4);
        assert_eq!(DEFAULT_EXPENSE_CATEGORIES.len(), 8);
    }
}
