//! Labels and messages shown to the user

/// Month names, in the genitive form used after a day number ("5 мая")
pub const MONTH_NAMES: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня",
    "июля", "августа", "сентября", "октября", "ноября", "декабря",
];

/// Weekday names, Monday first
pub const DAY_NAMES: [&str; 7] = [
    "Понедельник", "Вторник", "Среда", "Четверг", "Пятница", "Суббота", "Воскресенье",
];

pub const TASK_CREATED: &str = "Задача успешно создана!";
pub const TASK_UPDATED: &str = "Задача обновлена!";
pub const TASK_DELETED: &str = "Задача удалена!";

pub const LOAD_FAILED: &str = "Ошибка загрузки задач";
pub const CREATE_FAILED: &str = "Ошибка создания задачи";
pub const UPDATE_FAILED: &str = "Ошибка обновления задачи";
pub const DELETE_FAILED: &str = "Ошибка удаления задачи";
pub const TITLE_REQUIRED: &str = "Пожалуйста, введите название задачи";

/// Returns the month name (genitive) for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[((month + 11) % 12) as usize]
}
