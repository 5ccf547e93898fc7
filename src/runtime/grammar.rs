use super::syntax::{AssignOp, BinaryOp, DeclKind, Expr, LogicalOp, Stmt, UnaryOp};

// Grammar for the JavaScript subset the runner accepts. It covers everything
// the transpiler emits plus the plain statements users paste in directly.
peg::parser! {
    pub grammar script() for str {
        // Whitespace and comments
        rule _() = quiet!{ (whitespace() / line_comment() / block_comment())* }
        rule whitespace() = [' ' | '\t' | '\n' | '\r' | '\u{feff}' | '\u{a0}']
        rule line_comment() = "//" [^'\n']*
        rule block_comment() = "/*" (!"*/" [_])* "*/"

        rule ident_start() = ['a'..='z' | 'A'..='Z' | '_' | '$']
        rule ident_char() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$']

        // Keywords must not run into an identifier: `letter` is a name.
        rule kw_let() = "let" !ident_char()
        rule kw_const() = "const" !ident_char()
        rule kw_var() = "var" !ident_char()
        rule kw_if() = "if" !ident_char()
        rule kw_else() = "else" !ident_char()
        rule kw_for() = "for" !ident_char()
        rule kw_while() = "while" !ident_char()

        rule reserved() = ("let" / "const" / "var" / "if" / "else" / "for" / "while"
            / "true" / "false" / "null" / "undefined" / "NaN" / "Infinity") !ident_char()

        rule name() -> String
            = n:$(ident_start() ident_char()*) { n.to_string() }

        rule identifier() -> String
            = quiet!{ !reserved() n:name() { n } }
            / expected!("identifier")

        // Literals
        rule digits() = ['0'..='9']+
        rule exponent() = ['e' | 'E'] ['+' | '-']? digits()

        rule number() -> f64
            = quiet!{
                n:$(digits() ("." digits()?)? exponent()? / "." digits() exponent()?) !ident_start()
                {? n.parse().or(Err("number")) }
            }
            / expected!("number")

        rule hex() = ['0'..='9' | 'a'..='f' | 'A'..='F']

        rule escape() -> char
            = "n" { '\n' }
            / "t" { '\t' }
            / "r" { '\r' }
            / "0" { '\0' }
            / "u" h:$(hex()*<4>) {?
                u32::from_str_radix(h, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or("unicode escape")
            }
            / c:[^'\n'] { c }

        rule double_char() -> char
            = "\\" c:escape() { c }
            / c:[^'"' | '\\' | '\n'] { c }

        rule single_char() -> char
            = "\\" c:escape() { c }
            / c:[^'\'' | '\\' | '\n'] { c }

        rule string() -> String
            = "\"" s:double_char()* "\"" { s.into_iter().collect() }
            / "'" s:single_char()* "'" { s.into_iter().collect() }

        rule atom() -> Expr
            = n:number() { Expr::Number(n) }
            / s:string() { Expr::Str(s) }
            / "true" !ident_char() { Expr::Bool(true) }
            / "false" !ident_char() { Expr::Bool(false) }
            / "null" !ident_char() { Expr::Null }
            / "undefined" !ident_char() { Expr::Undefined }
            / "NaN" !ident_char() { Expr::Number(f64::NAN) }
            / "Infinity" !ident_char() { Expr::Number(f64::INFINITY) }
            / i:identifier() { Expr::Ident(i) }
            / "(" _ e:expression() _ ")" { e }

        // Expressions, lowest precedence first. Longer operators are listed
        // before their prefixes.
        pub rule expression() -> Expr = precedence!{
            x:(@) _ "||" _ y:@ { Expr::logical(LogicalOp::Or, x, y) }
            --
            x:(@) _ "&&" _ y:@ { Expr::logical(LogicalOp::And, x, y) }
            --
            x:(@) _ "===" _ y:@ { Expr::binary(BinaryOp::StrictEq, x, y) }
            x:(@) _ "!==" _ y:@ { Expr::binary(BinaryOp::StrictNotEq, x, y) }
            x:(@) _ "==" _ y:@ { Expr::binary(BinaryOp::Eq, x, y) }
            x:(@) _ "!=" _ y:@ { Expr::binary(BinaryOp::NotEq, x, y) }
            --
            x:(@) _ "<=" _ y:@ { Expr::binary(BinaryOp::Le, x, y) }
            x:(@) _ ">=" _ y:@ { Expr::binary(BinaryOp::Ge, x, y) }
            x:(@) _ "<" _ y:@ { Expr::binary(BinaryOp::Lt, x, y) }
            x:(@) _ ">" _ y:@ { Expr::binary(BinaryOp::Gt, x, y) }
            --
            x:(@) _ "+" !("+" / "=") _ y:@ { Expr::binary(BinaryOp::Add, x, y) }
            x:(@) _ "-" !("-" / "=") _ y:@ { Expr::binary(BinaryOp::Sub, x, y) }
            --
            x:(@) _ "*" !"=" _ y:@ { Expr::binary(BinaryOp::Mul, x, y) }
            x:(@) _ "/" !"=" _ y:@ { Expr::binary(BinaryOp::Div, x, y) }
            x:(@) _ "%" !"=" _ y:@ { Expr::binary(BinaryOp::Rem, x, y) }
            --
            "!" _ x:@ { Expr::unary(UnaryOp::Not, x) }
            "-" _ x:@ { Expr::unary(UnaryOp::Negate, x) }
            "+" _ x:@ { Expr::unary(UnaryOp::Plus, x) }
            --
            a:atom() { a }
        }

        // Statements. A missing `;` is accepted only before a line break, a
        // closing brace or the end of input.
        rule inline_space() = quiet!{ ([' ' | '\t'] / line_comment() / block_comment())* }
        rule semi()
            = _ ";"
            / inline_space() &(['\n' | '\r'] / "}" / ![_])

        rule decl_kind() -> DeclKind
            = kw_let() { DeclKind::Let }
            / kw_const() { DeclKind::Const }
            / kw_var() { DeclKind::Var }

        rule declaration() -> Stmt
            = kind:decl_kind() _ name:identifier() init:(_ "=" !"=" _ e:expression() { e })? {
                Stmt::Declare { kind, name, init }
            }

        rule assign_op() -> Option<AssignOp>
            = "+=" { Some(AssignOp::Add) }
            / "-=" { Some(AssignOp::Sub) }
            / "*=" { Some(AssignOp::Mul) }
            / "/=" { Some(AssignOp::Div) }
            / "%=" { Some(AssignOp::Rem) }
            / "=" !"=" { None }

        rule assignment() -> Stmt
            = name:identifier() _ op:assign_op() _ value:expression() {
                Stmt::Assign { name, op, value }
            }

        rule delta() -> f64
            = "++" { 1.0 }
            / "--" { -1.0 }

        rule update() -> Stmt
            = name:identifier() _ delta:delta() { Stmt::Update { name, delta } }
            / delta:delta() _ name:identifier() { Stmt::Update { name, delta } }

        rule console() -> Stmt
            = "console" _ "." _ method:name() _ "(" _ args:(expression() ** (_ "," _)) _ ("," _)? ")" {
                Stmt::Console { method, args }
            }

        rule block() -> Vec<Stmt>
            = "{" _ body:(s:statement() _ { s })* "}" { body }

        rule body() -> Vec<Stmt>
            = block()
            / s:statement() { vec![s] }

        rule if_statement() -> Stmt
            = kw_if() _ "(" _ condition:expression() _ ")" _ then_branch:body()
              else_branch:(_ kw_else() _ b:else_body() { b })? {
                Stmt::If { condition, then_branch, else_branch }
            }

        rule else_body() -> Vec<Stmt>
            = s:if_statement() { vec![s] }
            / body()

        rule for_init() -> Stmt
            = declaration()
            / assignment()

        rule for_update() -> Stmt
            = update()
            / assignment()

        rule for_statement() -> Stmt
            = kw_for() _ "(" _ init:for_init()? _ ";" _ condition:expression()? _ ";" _
              update:for_update()? _ ")" _ body:body() {
                Stmt::For {
                    init: init.map(Box::new),
                    condition,
                    update: update.map(Box::new),
                    body,
                }
            }

        rule while_statement() -> Stmt
            = kw_while() _ "(" _ condition:expression() _ ")" _ body:body() {
                Stmt::While { condition, body }
            }

        rule statement() -> Stmt
            = s:declaration() semi() { s }
            / if_statement()
            / for_statement()
            / while_statement()
            / b:block() { Stmt::Block(b) }
            / s:console() semi() { s }
            / s:update() semi() { s }
            / s:assignment() semi() { s }
            / ";" { Stmt::Empty }
            / e:expression() semi() { Stmt::Expr(e) }

        pub rule program() -> Vec<Stmt>
            = _ body:(s:statement() _ { s })* { body }
    }
}
