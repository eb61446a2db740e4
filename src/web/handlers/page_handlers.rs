// src/web/handlers/page_handlers.rs
use rocket::response::content::RawHtml;

const JOB_PARSER_PAGE: &str = include_str!("../../../static/job_parser.html");

pub fn job_parser_page_handler() -> RawHtml<&'static str> {
    RawHtml(JOB_PARSER_PAGE)
}
