use serde_json::Value;

use super::{
	lexer::{
		Spanned,
		Token,
	},
	QueryParseError,
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
	Eq,
	NotEq,
	Lt,
	LtEq,
	Gt,
	GtEq,
	In,
	NotIn,
}

/// Parsed query expression
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
	Literal(Value),
	Name(String),
	Member(Box<Expr>, String),
	Index(Box<Expr>, Box<Expr>),
	List(Vec<Expr>),
	Neg(Box<Expr>),
	Not(Box<Expr>),
	And(Box<Expr>, Box<Expr>),
	Or(Box<Expr>, Box<Expr>),
	Compare(CompareOp, Box<Expr>, Box<Expr>),
}

/// How deeply a query may nest. Bounds recursion while parsing, evaluating and
/// dropping the tree.
pub(crate) const MAX_DEPTH: usize = 64;

pub(crate) fn parse(tokens: &[Spanned], source_len: usize) -> Result<Expr, QueryParseError> {
	let mut parser = Parser {
		tokens,
		pos: 0,
		source_len,
		depth: 0,
	};
	let expr = parser.or()?;
	if let Some(extra) = parser.peek_spanned() {
		return Err(QueryParseError::new(extra.offset, format!("unexpected {}", describe(&extra.token))));
	}
	return Ok(expr);
}

struct Parser<'a> {
	tokens: &'a [Spanned],
	pos: usize,
	source_len: usize,

	/// Nodes enclosing the one being parsed, counting each link of a chain
	depth: usize,
}

impl<'a> Parser<'a> {
	fn peek_spanned(&self) -> Option<&'a Spanned> {
		return self.tokens.get(self.pos);
	}

	fn peek(&self) -> Option<&'a Token> {
		return self.peek_spanned().map(|spanned| &spanned.token);
	}

	fn peek_second(&self) -> Option<&'a Token> {
		return self.tokens.get(self.pos + 1).map(|spanned| &spanned.token);
	}

	fn offset(&self) -> usize {
		return match self.peek_spanned() {
			Some(spanned) => spanned.offset,
			None => self.source_len,
		};
	}

	fn enter(&mut self) -> Result<(), QueryParseError> {
		self.depth += 1;
		if self.depth > MAX_DEPTH {
			return Err(QueryParseError::new(self.offset(), format!("query nests deeper than {} levels", MAX_DEPTH)));
		}
		return Ok(());
	}

	fn eat(&mut self, token: &Token) -> bool {
		if self.peek() == Some(token) {
			self.pos += 1;
			return true;
		}
		return false;
	}

	fn expect(&mut self, token: &Token) -> Result<(), QueryParseError> {
		if self.eat(token) {
			return Ok(());
		}
		let found = match self.peek() {
			Some(found) => describe(found),
			None => String::from("end of query"),
		};
		return Err(QueryParseError::new(self.offset(), format!("expected {}, found {}", describe(token), found)));
	}

	fn or(&mut self) -> Result<Expr, QueryParseError> {
		let depth = self.depth;
		let mut lhs = self.and()?;
		while self.eat(&Token::Or) {
			self.enter()?;
			let rhs = self.and()?;
			lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
		}
		self.depth = depth;
		return Ok(lhs);
	}

	fn and(&mut self) -> Result<Expr, QueryParseError> {
		let depth = self.depth;
		let mut lhs = self.not()?;
		while self.eat(&Token::And) {
			self.enter()?;
			let rhs = self.not()?;
			lhs = Expr::And(Box::new(lhs), Box::new(rhs));
		}
		self.depth = depth;
		return Ok(lhs);
	}

	fn not(&mut self) -> Result<Expr, QueryParseError> {
		if self.eat(&Token::Not) {
			let depth = self.depth;
			self.enter()?;
			let operand = self.not()?;
			self.depth = depth;
			return Ok(Expr::Not(Box::new(operand)));
		}
		return self.comparison();
	}

	fn compare_op(&mut self) -> Option<CompareOp> {
		let op = match (self.peek(), self.peek_second()) {
			(Some(Token::EqEq), _) => CompareOp::Eq,
			(Some(Token::NotEq), _) => CompareOp::NotEq,
			(Some(Token::Lt), _) => CompareOp::Lt,
			(Some(Token::LtEq), _) => CompareOp::LtEq,
			(Some(Token::Gt), _) => CompareOp::Gt,
			(Some(Token::GtEq), _) => CompareOp::GtEq,
			(Some(Token::In), _) => CompareOp::In,
			(Some(Token::Not), Some(Token::In)) => {
				self.pos += 1;
				CompareOp::NotIn
			},
			_ => return None,
		};
		self.pos += 1;
		return Some(op);
	}

	fn comparison(&mut self) -> Result<Expr, QueryParseError> {
		let lhs = self.unary()?;
		let op = match self.compare_op() {
			Some(op) => op,
			None => return Ok(lhs),
		};
		let rhs = self.unary()?;

		let offset = self.offset();
		if self.compare_op().is_some() {
			return Err(QueryParseError::new(offset, "chained comparisons are not supported, join them with `and`"));
		}
		return Ok(Expr::Compare(op, Box::new(lhs), Box::new(rhs)));
	}

	fn unary(&mut self) -> Result<Expr, QueryParseError> {
		if self.eat(&Token::Minus) {
			let depth = self.depth;
			self.enter()?;
			let operand = self.unary()?;
			self.depth = depth;
			return Ok(Expr::Neg(Box::new(operand)));
		}
		return self.postfix();
	}

	fn postfix(&mut self) -> Result<Expr, QueryParseError> {
		let depth = self.depth;
		let mut expr = self.primary()?;
		loop {
			if self.eat(&Token::Dot) {
				self.enter()?;
				let offset = self.offset();
				match self.peek() {
					Some(Token::Ident(member)) => {
						self.pos += 1;
						expr = Expr::Member(Box::new(expr), member.clone());
					},
					_ => return Err(QueryParseError::new(offset, "expected a member name after `.`")),
				}
			} else if self.eat(&Token::LBracket) {
				self.enter()?;
				let index = self.or()?;
				self.expect(&Token::RBracket)?;
				expr = Expr::Index(Box::new(expr), Box::new(index));
			} else {
				self.depth = depth;
				return Ok(expr);
			}
		}
	}

	fn primary(&mut self) -> Result<Expr, QueryParseError> {
		let offset = self.offset();
		let token = match self.peek() {
			Some(token) => token,
			None => return Err(QueryParseError::new(offset, "unexpected end of query")),
		};
		self.pos += 1;

		let expr = match token {
			Token::Ident(name) => Expr::Name(name.clone()),
			Token::Int(value) => Expr::Literal(Value::from(*value)),
			Token::Float(value) => Expr::Literal(Value::from(*value)),
			Token::Str(value) => Expr::Literal(Value::String(value.clone())),
			Token::True => Expr::Literal(Value::Bool(true)),
			Token::False => Expr::Literal(Value::Bool(false)),
			Token::Null => Expr::Literal(Value::Null),
			Token::LParen => {
				let depth = self.depth;
				self.enter()?;
				let inner = self.or()?;
				self.expect(&Token::RParen)?;
				self.depth = depth;
				inner
			},
			Token::LBracket => {
				let depth = self.depth;
				self.enter()?;
				let mut items = Vec::new();
				while !self.eat(&Token::RBracket) {
					items.push(self.or()?);
					if !self.eat(&Token::Comma) {
						self.expect(&Token::RBracket)?;
						break;
					}
				}
				self.depth = depth;
				Expr::List(items)
			},
			other => return Err(QueryParseError::new(offset, format!("unexpected {}", describe(other)))),
		};

		return Ok(expr);
	}
}

fn describe(token: &Token) -> String {
	return match token {
		Token::Ident(name) => format!("name `{}`", name),
		Token::Int(value) => format!("number `{}`", value),
		Token::Float(value) => format!("number `{}`", value),
		Token::Str(value) => format!("string {:?}", value),
		Token::And => String::from("`and`"),
		Token::Or => String::from("`or`"),
		Token::Not => String::from("`not`"),
		Token::In => String::from("`in`"),
		Token::True => String::from("`True`"),
		Token::False => String::from("`False`"),
		Token::Null => String::from("`None`"),
		Token::EqEq => String::from("`==`"),
		Token::NotEq => String::from("`!=`"),
		Token::Lt => String::from("`<`"),
		Token::LtEq => String::from("`<=`"),
		Token::Gt => String::from("`>`"),
		Token::GtEq => String::from("`>=`"),
		Token::Minus => String::from("`-`"),
		Token::Dot => String::from("`.`"),
		Token::Comma => String::from("`,`"),
		Token::LParen => String::from("`(`"),
		Token::RParen => String::from("`)`"),
		Token::LBracket => String::from("`[`"),
		Token::RBracket => String::from("`]`"),
	};
}
