//! Raw messages shaped like the ones a framework mailer generates:
//! CRLF line endings and `--------<10 chars>` boundaries.

#![allow(dead_code)]

pub const PLAIN: &str = concat!(
    "Message-ID: <abc123@host>\r\n",
    "Date: Mon, 01 Jan 2024 00:00:00 +0000\r\n",
    "Subject: Hi\r\n",
    "\r\n",
    "Hello world",
);

pub fn plain_with_date(id: &str, date: Option<&str>) -> String {
    let mut raw = format!("Message-ID: <{id}@example.com>\r\n");
    if let Some(date) = date {
        raw.push_str(&format!("Date: {date}\r\n"));
    }
    raw.push_str("Subject: Dated\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\nBody\r\n");
    raw
}

pub fn alternative() -> String {
    concat!(
        "MIME-Version: 1.0\r\n",
        "X-Mailer: Nette Framework\r\n",
        "Date: Tue, 02 Jan 2024 10:30:00 +0100\r\n",
        "From: =?UTF-8?B?SmFuIE5vdsOhaw==?= <jan@example.com>\r\n",
        "To: dev@example.com\r\n",
        "Subject: =?UTF-8?Q?Objedn=C3=A1vka?=\r\n",
        "Message-ID: <x7k2p9q1zz@example.com>\r\n",
        "Content-Type: multipart/alternative;\r\n",
        "\tboundary=\"--------AbCdEfGhIj\"\r\n",
        "\r\n",
        "----------AbCdEfGhIj\r\n",
        "Content-Type: text/plain; charset=UTF-8\r\n",
        "Content-Transfer-Encoding: 7bit\r\n",
        "\r\n",
        "Your order is ready.\r\n",
        "----------AbCdEfGhIj\r\n",
        "Content-Type: text/html; charset=UTF-8\r\n",
        "Content-Transfer-Encoding: 7bit\r\n",
        "\r\n",
        "<p>Your order is <b>ready</b>.</p>\r\n",
        "----------AbCdEfGhIj--",
    )
    .to_string()
}

/// A `multipart/mixed` message with one text body and the given
/// `(filename, base64 data)` attachments.
pub fn mixed(attachments: &[(&str, &str)]) -> String {
    let mut raw = String::from(concat!(
        "MIME-Version: 1.0\r\n",
        "Date: Wed, 03 Jan 2024 08:00:00 +0000\r\n",
        "From: app@example.com\r\n",
        "To: dev@example.com\r\n",
        "Subject: Invoice\r\n",
        "Message-ID: <m1x2y3z4w5@example.com>\r\n",
        "Content-Type: multipart/mixed;\r\n",
        "\tboundary=\"--------MiXeDbOuNd\"\r\n",
        "\r\n",
        "----------MiXeDbOuNd\r\n",
        "Content-Type: text/plain; charset=UTF-8\r\n",
        "Content-Transfer-Encoding: 7bit\r\n",
        "\r\n",
        "See the attached invoice.\r\n",
    ));
    for (filename, data) in attachments {
        raw.push_str("----------MiXeDbOuNd\r\n");
        raw.push_str("Content-Type: application/octet-stream\r\n");
        raw.push_str("Content-Transfer-Encoding: base64\r\n");
        raw.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{filename}\"\r\n"
        ));
        raw.push_str("\r\n");
        raw.push_str(data);
        raw.push_str("\r\n");
    }
    raw.push_str("----------MiXeDbOuNd--");
    raw
}
