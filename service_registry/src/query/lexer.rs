use super::QueryParseError;


#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
	Ident(String),
	Int(i64),
	Float(f64),
	Str(String),

	// Keywords
	And,
	Or,
	Not,
	In,
	True,
	False,
	Null,

	// Operators and punctuation
	EqEq,
	NotEq,
	Lt,
	LtEq,
	Gt,
	GtEq,
	Minus,
	Dot,
	Comma,
	LParen,
	RParen,
	LBracket,
	RBracket,
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
	pub token: Token,
	pub offset: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, QueryParseError> {
	let mut tokens = Vec::new();
	let bytes = source.as_bytes();
	let mut pos = 0;

	while pos < bytes.len() {
		let c = bytes[pos];
		let start = pos;

		if c.is_ascii_whitespace() {
			pos += 1;
			continue;
		}

		let token = if c.is_ascii_alphabetic() || c == b'_' {
			while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
				pos += 1;
			}
			keyword_or_ident(&source[start..pos])
		} else if c.is_ascii_digit() {
			let (token, end) = number(source, start)?;
			pos = end;
			token
		} else if c == b'\'' || c == b'"' {
			let (value, end) = string(source, start)?;
			pos = end;
			Token::Str(value)
		} else {
			let next = bytes.get(pos + 1).copied();
			let (token, width) = match (c, next) {
				(b'=', Some(b'=')) => (Token::EqEq, 2),
				(b'!', Some(b'=')) => (Token::NotEq, 2),
				(b'<', Some(b'=')) => (Token::LtEq, 2),
				(b'>', Some(b'=')) => (Token::GtEq, 2),
				(b'<', _) => (Token::Lt, 1),
				(b'>', _) => (Token::Gt, 1),
				(b'-', _) => (Token::Minus, 1),
				(b'.', _) => (Token::Dot, 1),
				(b',', _) => (Token::Comma, 1),
				(b'(', _) => (Token::LParen, 1),
				(b')', _) => (Token::RParen, 1),
				(b'[', _) => (Token::LBracket, 1),
				(b']', _) => (Token::RBracket, 1),
				(b'=', _) => return Err(QueryParseError::new(start, "`=` is not a comparison, use `==`")),
				_ => {
					let found = source[start..].chars().next().unwrap_or('?');
					return Err(QueryParseError::new(start, format!("unexpected character {:?}", found)));
				},
			};
			pos += width;
			token
		};

		tokens.push(Spanned { token, offset: start });
	}

	return Ok(tokens);
}

fn keyword_or_ident(word: &str) -> Token {
	return match word {
		"and" => Token::And,
		"or" => Token::Or,
		"not" => Token::Not,
		"in" => Token::In,
		"True" | "true" => Token::True,
		"False" | "false" => Token::False,
		"None" | "null" => Token::Null,
		_ => Token::Ident(String::from(word)),
	};
}

fn number(source: &str, start: usize) -> Result<(Token, usize), QueryParseError> {
	let bytes = source.as_bytes();
	let mut pos = start;
	let mut is_float = false;

	while pos < bytes.len() && bytes[pos].is_ascii_digit() {
		pos += 1;
	}
	// A dot only continues the number when a digit follows it
	if pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit() {
		is_float = true;
		pos += 1;
		while pos < bytes.len() && bytes[pos].is_ascii_digit() {
			pos += 1;
		}
	}
	if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
		let mut exponent_end = pos + 1;
		if exponent_end < bytes.len() && (bytes[exponent_end] == b'+' || bytes[exponent_end] == b'-') {
			exponent_end += 1;
		}
		if exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
			is_float = true;
			pos = exponent_end;
			while pos < bytes.len() && bytes[pos].is_ascii_digit() {
				pos += 1;
			}
		}
	}

	let text = &source[start..pos];
	if is_float {
		return match text.parse::<f64>() {
			Ok(value) if value.is_finite() => Ok((Token::Float(value), pos)),
			Ok(_) => Err(QueryParseError::new(start, format!("number `{}` is out of range", text))),
			Err(_) => Err(QueryParseError::new(start, format!("invalid number `{}`", text))),
		};
	} else {
		return match text.parse::<i64>() {
			Ok(value) => Ok((Token::Int(value), pos)),
			Err(_) => Err(QueryParseError::new(start, format!("integer `{}` is out of range", text))),
		};
	}
}

fn string(source: &str, start: usize) -> Result<(String, usize), QueryParseError> {
	let mut chars = source[start..].char_indices();
	let quote = match chars.next() {
		Some((_, quote)) => quote,
		None => return Err(QueryParseError::new(start, "expected a string")),
	};

	let mut value = String::new();
	while let Some((index, c)) = chars.next() {
		if c == quote {
			return Ok((value, start + index + c.len_utf8()));
		}
		if c == '\\' {
			let escaped = match chars.next() {
				Some((_, 'n')) => '\n',
				Some((_, 't')) => '\t',
				Some((_, 'r')) => '\r',
				Some((_, '0')) => '\0',
				Some((_, other)) => other,
				None => break,
			};
			value.push(escaped);
		} else {
			value.push(c);
		}
	}

	return Err(QueryParseError::new(start, "unterminated string"));
}
