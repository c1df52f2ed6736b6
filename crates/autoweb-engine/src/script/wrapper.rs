//! The in-page wrapper around one step fragment.

use autoweb_protocols::js_string;
use serde_json::{Map, Value};

use crate::normalize::RESULT_KEYS;

/// Names the wrapper owns or that cannot be `let`-declared.
const RESERVED: &[&str] = &[
    "env", "target", "console", "arguments", "await", "break", "case", "catch", "class", "const",
    "continue", "debugger", "default", "delete", "do", "else", "enum", "eval", "export", "extends",
    "false", "finally", "for", "function", "if", "implements", "import", "in", "instanceof",
    "interface", "let", "new", "null", "package", "private", "protected", "public", "return",
    "static", "super", "switch", "this", "throw", "true", "try", "typeof", "undefined", "var",
    "void", "while", "with", "yield", "NaN", "Infinity",
];

/// Whether `name` can be carried as a shared binding.
pub fn is_bindable(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !name.starts_with("__aw")
        && !RESERVED.contains(&name)
}

/// Binding list for one run: promoted names, identifier-like env keys and
/// the result names.
pub fn binding_names(promoted: &[String], env: &Map<String, Value>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let candidates = promoted
        .iter()
        .map(String::as_str)
        .chain(env.keys().map(String::as_str))
        .chain(RESULT_KEYS.iter().copied());
    for name in candidates {
        if is_bindable(name) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

const PRELUDE: &str = r#"
  const __awLogs = [];
  const __awFmt = (v) => {
    if (typeof v === 'string') return v;
    try { return JSON.stringify(v); } catch (_) { return String(v); }
  };
  const __awLog = (prefix) => (...args) => { __awLogs.push(prefix + args.map(__awFmt).join(' ')); };
  const console = {
    log: __awLog(''), info: __awLog(''), debug: __awLog(''),
    warn: __awLog('[warn] '), error: __awLog('[error] '),
  };
  const __awSafe = (v) => {
    if (v === undefined) return null;
    try {
      return JSON.parse(JSON.stringify(v, (_k, x) => {
        if (typeof x === 'bigint') return x.toString();
        if (typeof x === 'function') return undefined;
        if (typeof NodeList !== 'undefined' && (x instanceof NodeList || x instanceof HTMLCollection)) return Array.from(x);
        if (typeof Node !== 'undefined' && x instanceof Node) return (x.textContent || '').trim();
        return x;
      }));
    } catch (_) { return String(v); }
  };
  const __awFail = (e) => (e instanceof Error) ? (e.name + ': ' + e.message) : String(e);
  const __awPick = (e) => (e && typeof e === 'object' && !Array.isArray(e)) ? e : __awEnv;
  const __awSleep = (ms) => new Promise((r) => setTimeout(r, ms));
  const __awTimeoutError = (msg) => { const e = new Error(msg); e.name = 'TimeoutError'; return e; };
  const __awFind = (s) => {
    const el = document.querySelector(s);
    if (!el) throw new Error('Element not found: ' + s);
    return el;
  };
  const target = {
    doc: document,
    query: (s) => document.querySelector(s),
    queryAll: (s) => Array.from(document.querySelectorAll(s)),
    text: (s) => { const el = document.querySelector(s); return el ? (el.innerText || el.textContent || '').trim() : ''; },
    click: async (s) => {
      const el = __awFind(s);
      el.scrollIntoView({ block: 'center' });
      el.click();
      await __awSleep(50);
    },
    fill: async (s, value) => {
      const el = __awFind(s);
      el.focus();
      const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value');
      if (desc && desc.set) desc.set.call(el, value); else el.value = value;
      el.dispatchEvent(new Event('input', { bubbles: true }));
      el.dispatchEvent(new Event('change', { bubbles: true }));
    },
    waitFor: async (cond, ms = 10000) => {
      const end = Date.now() + ms;
      while (Date.now() < end) {
        const hit = typeof cond === 'function' ? await cond() : document.querySelector(cond);
        if (hit) return hit;
        await __awSleep(100);
      }
      throw __awTimeoutError('waitFor ' + (typeof cond === 'string' ? cond : 'condition') + ' exceeded ' + ms + 'ms');
    },
    sleep: __awSleep,
    goto: (url) => { location.href = url; },
  };
"#;

/// Wrap a (rewritten) fragment into a self-contained expression.
///
/// The expression resolves to `{env, value, logs}` on success and
/// `{error, env, logs}` when the fragment throws or the in-page timeout
/// fires. Helpers live in the outer scope so bindings cannot shadow the
/// globals they use.
pub fn wrap_fragment(code: &str, bindings: &[String], env: &Map<String, Value>, timeout_ms: u64) -> String {
    let env_json = serde_json::to_string(env).unwrap_or_else(|_| "{}".to_string());

    let mut declare = String::new();
    let mut collect = String::new();
    for name in bindings {
        let key = js_string(name);
        declare.push_str(&format!("    let {name} = __awSeed[{key}];\n"));
        collect.push_str(&format!(
            "      if ({name} !== undefined && {name} !== __awSeed[{key}]) __awOut[{key}] = {name};\n"
        ));
    }

    format!(
        r#"(async () => {{
  const __awEnv = {env_json};
  const __awSeed = Object.assign({{}}, __awEnv);
{PRELUDE}
  const __awRun = (body) => new Promise((resolve, reject) => {{
    const timer = setTimeout(() => reject(__awTimeoutError('step timed out after {timeout_ms}ms')), {timeout_ms});
    Promise.resolve().then(body).then(
      (v) => {{ clearTimeout(timer); resolve(v); }},
      (e) => {{ clearTimeout(timer); reject(e); }},
    );
  }});
  return await (async () => {{
    let env = __awEnv;
{declare}    const __awCollect = () => {{
      const __awOut = __awPick(env);
{collect}      return __awSafe(__awOut);
    }};
    try {{
      const __awValue = await __awRun(async () => {{
{code}
      }});
      return {{ env: __awCollect(), value: __awSafe(__awValue), logs: __awLogs }};
    }} catch (__awErr) {{
      return {{ error: __awFail(__awErr), env: __awCollect(), logs: __awLogs }};
    }}
  }})();
}})()"#
    )
}
