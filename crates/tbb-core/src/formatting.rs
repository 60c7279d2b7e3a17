//! Reply texts and Telegram HTML rendering for search results.

use crate::books::Book;

pub const START_TEXT: &str = "Бот предназначен для поиска книг\n\n\
Используйте /search [запрос] для поиска книг\n\
Например: /search Гарри Поттер";

pub const HELP_TEXT: &str = "Доступные команды:\n\n\
/search [текст] - найти книги\n\
/help - справка";

pub const FALLBACK_TEXT: &str = "Используйте /search для поиска книг или /help - для справки";

pub const EMPTY_QUERY_TEXT: &str = "Введите поисковый запрос после /search";

pub const SEARCH_FAILED_TEXT: &str = "Ошибка при поиске книг!";

pub const UPDATE_FAILED_TEXT: &str = "Произошла ошибка при обработке запроса!";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Plain-text reply for a query that matched nothing.
pub fn no_results_text(query: &str) -> String {
    format!("По запросу \"{query}\" книг не найдено")
}

/// Render books as Telegram HTML: title and authors in italics, one block per book.
pub fn format_search_results(books: &[Book]) -> String {
    let mut out = String::from("Результаты поиска:\n\n");
    for book in books {
        let title = escape_html(&book.title);
        let authors = escape_html(&book.authors.join(", "));
        out.push_str(&format!("Название: <i>{title}</i>\n"));
        out.push_str(&format!("Авторство: <i>{authors}</i>\n\n"));
    }
    out
}
