pub mod coffee_bean_grade_info;
pub mod detection_history;
pub mod detection_record;
pub mod favorite_record;

pub use coffee_bean_grade_info::Entity as CoffeeBeanGradeInfo;
pub use detection_history::Entity as DetectionHistory;
pub use detection_record::Entity as DetectionRecord;
pub use favorite_record::Entity as FavoriteRecord;
