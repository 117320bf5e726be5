pub mod get_report_route;
