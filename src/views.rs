//! Server-rendered HTML boundary. Markup stays intentionally minimal; the
//! one rule that matters here is that every user-supplied string is escaped.

use axum::response::Html;

use crate::store::{Item, TodoList};

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>",
        escape(title),
        body
    ))
}

pub fn home() -> Html<String> {
    page(
        "Keepsake",
        "<h1>Keepsake</h1>\n\
         <p>Your todo list and your secrets, behind one login.</p>\n\
         <nav>\n\
         <a href=\"/register\">Register</a>\n\
         <a href=\"/login\">Login</a>\n\
         <a href=\"/auth/google\">Sign in with Google</a>\n\
         <a href=\"/secrets\">Secrets wall</a>\n\
         </nav>",
    )
}

pub fn login() -> Html<String> {
    page(
        "Login",
        "<h1>Login</h1>\n\
         <form action=\"/login\" method=\"post\">\n\
         <input type=\"text\" name=\"username\" placeholder=\"Username\" required>\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
         <button type=\"submit\">Login</button>\n\
         </form>\n\
         <a href=\"/auth/google\">Sign in with Google</a>",
    )
}

pub fn register() -> Html<String> {
    page(
        "Register",
        "<h1>Register</h1>\n\
         <form action=\"/register\" method=\"post\">\n\
         <input type=\"text\" name=\"username\" placeholder=\"Username\" required>\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
         <button type=\"submit\">Register</button>\n\
         </form>",
    )
}

pub fn list(list: &TodoList) -> Html<String> {
    let mut body = format!("<h1>{}</h1>\n<ul>\n", escape(&list.name));
    for item in &list.items {
        body.push_str(&item_row(item));
    }
    body.push_str(
        "</ul>\n\
         <form action=\"/add\" method=\"post\">\n\
         <input type=\"text\" name=\"new_item\" placeholder=\"New item\" autofocus>\n\
         <button type=\"submit\">+</button>\n\
         </form>\n\
         <a href=\"/logout\">Log out</a>",
    );
    page(&list.name, &body)
}

fn item_row(item: &Item) -> String {
    format!(
        "<li>\n\
         <form action=\"/delete\" method=\"post\">\n\
         <input type=\"checkbox\" name=\"checkbox\" value=\"{}\" onchange=\"this.form.submit()\">\n\
         <span>{}</span>\n\
         </form>\n\
         </li>\n",
        item.id,
        escape(&item.task)
    )
}

pub fn secrets(secrets: &[String]) -> Html<String> {
    let mut body = String::from("<h1>Secrets</h1>\n");
    if secrets.is_empty() {
        body.push_str("<p>No secrets yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for secret in secrets {
            body.push_str(&format!("<li>{}</li>\n", escape(secret)));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("<a href=\"/submit\">Share a secret</a>");
    page("Secrets", &body)
}

pub fn submit() -> Html<String> {
    page(
        "Share a secret",
        "<h1>Share a secret</h1>\n\
         <form action=\"/submit\" method=\"post\">\n\
         <textarea name=\"secret\" placeholder=\"What is your secret?\" required></textarea>\n\
         <button type=\"submit\">Submit</button>\n\
         </form>",
    )
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::default_list;

    #[test]
    fn escapes_markup_in_user_text() {
        assert_eq!(
            escape("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn list_view_renders_every_item_and_delete_form() {
        let seeded = default_list();
        let Html(html) = list(&seeded);

        for item in &seeded.items {
            assert!(html.contains(&escape(&item.task)));
            assert!(html.contains(&item.id.to_string()));
        }
        assert!(html.contains("action=\"/add\""));
        assert!(html.contains("action=\"/delete\""));
    }

    #[test]
    fn secrets_wall_has_no_author_attribution() {
        let Html(html) = secrets(&["s1".to_string(), "s2".to_string()]);
        assert!(html.contains("<li>s1</li>"));
        assert!(html.contains("<li>s2</li>"));
    }
}
