//! 管理页渲染：服务端拼接单页 HTML，不引入模板引擎。

use axum::{extract::State, response::Html};
use cg_shared_protocol::{CaInfo, ClientStatus};
use tracing::error;

use crate::state::AppState;

/// 管理主页：CA 快照 + 操作表单。
pub(crate) async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let ca = match state.admin.get_ca().await {
        Ok(ca) => Some(ca),
        Err(err) => {
            error!("render page without ca snapshot: {err}");
            None
        }
    };
    Html(render_page(ca.as_ref()))
}

/// 渲染管理页 HTML。
fn render_page(ca: Option<&CaInfo>) -> String {
    let status_block = match ca {
        Some(ca) if ca.generating => {
            "<p class=\"notice\">CA 正在后台重建，客户端列表暂不可用。</p>".to_string()
        }
        Some(ca) if ca.clients.is_empty() => {
            "<p class=\"notice\">尚未签发任何客户端证书。</p>".to_string()
        }
        Some(ca) => render_client_table(ca),
        None => "<p class=\"notice error\">无法连接路由器配置服务，请稍后刷新。</p>".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>CertGate · TLS 客户端证书管理</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 42rem; color: #222; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: .4rem .6rem; text-align: left; }}
.notice {{ color: #555; }}
.notice.error {{ color: #a33; }}
form {{ margin: 1rem 0; }}
#qr-result {{ margin-top: .5rem; word-break: break-all; }}
</style>
</head>
<body>
<h1>TLS 客户端证书</h1>
{status_block}
<h2>新建客户端</h2>
<form id="new-client-form">
  <input name="clientName" maxlength="63" pattern="[a-zA-Z0-9_.-]+" required
         placeholder="客户端名称（字母数字与 _ . -）">
  <button type="submit">创建</button>
</form>
<h2>扫码下载凭据</h2>
<form id="issue-form">
  <input name="clientName" maxlength="63" pattern="[a-zA-Z0-9_.-]+" required
         placeholder="客户端名称">
  <button type="submit">生成一次性链接</button>
</form>
<div id="qr-result"></div>
<h2>维护</h2>
<form id="reset-form">
  <button type="submit">重置证书颁发机构</button>
</form>
<script>
async function postJson(url, body) {{
  const res = await fetch(url, {{
    method: 'POST',
    headers: {{ 'Content-Type': 'application/json' }},
    body: JSON.stringify(body || {{}}),
  }});
  return res.json();
}}
document.getElementById('new-client-form').addEventListener('submit', async (ev) => {{
  ev.preventDefault();
  const out = await postJson('/v1/ca/new-client',
    {{ clientName: ev.target.clientName.value }});
  alert(out.message);
}});
document.getElementById('issue-form').addEventListener('submit', async (ev) => {{
  ev.preventDefault();
  const out = await postJson('/v1/token/issue',
    {{ clientName: ev.target.clientName.value }});
  const box = document.getElementById('qr-result');
  if (!out.ok) {{ box.textContent = out.message; return; }}
  const link = out.data.scheme + '://' + out.data.host + out.data.path;
  box.textContent = '一次性链接（过期时间 ' +
    new Date(out.data.expiresAt * 1000).toLocaleTimeString() + '）：' + link;
}});
document.getElementById('reset-form').addEventListener('submit', async (ev) => {{
  ev.preventDefault();
  const out = await postJson('/v1/ca/reset');
  alert(out.message);
}});
</script>
</body>
</html>"#
    )
}

/// 渲染客户端状态表。
fn render_client_table(ca: &CaInfo) -> String {
    let mut rows = String::new();
    for client in &ca.clients {
        let status = match client.status {
            ClientStatus::Active => "active",
            ClientStatus::Revoked => "revoked",
            ClientStatus::Expired => "expired",
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{status}</td></tr>\n",
            html_escape(&client.name)
        ));
    }
    format!(
        "<table><thead><tr><th>客户端</th><th>状态</th></tr></thead>\n<tbody>\n{rows}</tbody></table>"
    )
}

/// 最小 HTML 转义；客户端名在入口已校验，这里只防御 daemon 侧数据。
fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
